// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry points used by triggers.

use dsync_adapters::ProducerAdapter;
use dsync_core::{Clock, Job, TripleStore};
use dsync_storage::{Ledger, LedgerError};
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::config::SyncConfig;
use crate::delta::{DeltaOutcome, DeltaSync};
use crate::dispatch::Dispatcher;
use crate::file_sync::{FileSync, FileSyncReport};

/// Outcome of one full trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub delta: DeltaOutcome,
    pub files: FileSyncReport,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; files: {}", self.delta, self.files)
    }
}

/// Delta pipeline and file-sync machine over one ledger.
pub struct Consumer<S, P, C> {
    ledger: Ledger<S, C>,
    delta: DeltaSync<S, P, C>,
    files: FileSync<S, P, C>,
    config: Arc<SyncConfig>,
}

impl<S, P, C> Consumer<S, P, C>
where
    S: TripleStore,
    P: ProducerAdapter,
    C: Clock,
{
    pub fn new(
        ledger: Ledger<S, C>,
        producer: P,
        dispatcher: Arc<dyn Dispatcher>,
        config: Arc<SyncConfig>,
    ) -> Self {
        let delta = DeltaSync::new(ledger.clone(), producer.clone(), dispatcher, Arc::clone(&config));
        let files = FileSync::new(ledger.clone(), producer, Arc::clone(&config));
        Self { ledger, delta, files, config }
    }

    pub fn ledger(&self) -> &Ledger<S, C> {
        &self.ledger
    }

    /// Fail Jobs left busy by a previous process. Must run before the first
    /// trigger of the long-running service only: a one-shot run cannot tell
    /// a crashed Job from one a live service is still driving.
    pub async fn startup(&self) -> Result<Vec<Job>, LedgerError> {
        let mut failed = Vec::new();
        for operation in [&self.config.delta_sync_operation, &self.config.initial_sync_operation] {
            failed.extend(self.ledger.fail_busy_jobs(operation).await?);
        }
        info!(failed = failed.len(), "startup sweep finished");
        Ok(failed)
    }

    pub async fn delta_sync(&self) -> DeltaOutcome {
        self.delta.start().await
    }

    pub async fn file_sync(&self) -> FileSyncReport {
        self.files.start().await
    }

    /// Delta sync followed by a file-sync pass over whatever it staged.
    pub async fn sync(&self) -> SyncReport {
        let delta = self.delta_sync().await;
        let files = self.file_sync().await;
        SyncReport { delta, files }
    }

    /// Delete every Job of `operation` with its Tasks. Returns how many
    /// Jobs were removed.
    pub async fn cleanup_jobs(&self, operation: &str) -> Result<usize, LedgerError> {
        let jobs = self.ledger.get_jobs(operation, &[], &[]).await?;
        for job in &jobs {
            self.ledger.cleanup_job(job).await?;
        }
        info!(%operation, jobs = jobs.len(), "cleaned up jobs");
        Ok(jobs.len())
    }
}

#[cfg(test)]
#[path = "consumer_tests.rs"]
mod tests;
