// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use dsync_adapters::ProducerAdapter;
use dsync_core::{parse_change_sets, sort_by_created, Clock, DeltaFile, Job, Status, Task, TripleStore};
use dsync_storage::{Ledger, LedgerError};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{apply_change_set, watermark, DeltaOutcome, SyncError};
use crate::config::SyncConfig;
use crate::dispatch::Dispatcher;

/// Drives one delta sync run against the ledger, producer and store.
pub struct DeltaSync<S, P, C> {
    ledger: Ledger<S, C>,
    producer: P,
    dispatcher: Arc<dyn Dispatcher>,
    config: Arc<SyncConfig>,
}

impl<S, P, C> DeltaSync<S, P, C>
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
        Self { ledger, producer, dispatcher, config }
    }

    /// Run and persist any failure. Never returns an error to the trigger.
    pub async fn start(&self) -> DeltaOutcome {
        let outcome = match self.run().await {
            Ok(outcome) => outcome,
            Err(SyncError::JobFailed { job, source }) => {
                DeltaOutcome::Failed { job: Some(job), error: source.to_string() }
            }
            Err(e) => {
                error!(error = %e, "delta sync failed outside of a job");
                let message = format!("Unexpected error while ingesting: {e}");
                if let Err(record) = self.ledger.record_error(&message).await {
                    error!(error = %record, "could not record delta sync error");
                }
                DeltaOutcome::Failed { job: None, error: e.to_string() }
            }
        };
        info!(service = %self.config.service_name, %outcome, "delta sync finished");
        outcome
    }

    /// One run. Errors inside a Job are recorded on the Job before being
    /// returned as [`SyncError::JobFailed`].
    pub async fn run(&self) -> Result<DeltaOutcome, SyncError> {
        let config = &self.config;
        if config.disable_delta_ingest {
            warn!("automated delta ingest disabled");
            return Ok(DeltaOutcome::Disabled);
        }
        if config.wait_for_initial_sync {
            let initial = self
                .ledger
                .get_latest_job_for_operation(&config.initial_sync_operation, &config.job_creator)
                .await?;
            if initial.map(|j| j.status) != Some(Status::Success) {
                info!("no successful initial sync job yet, not ingesting deltas");
                return Ok(DeltaOutcome::AwaitingInitialSync);
            }
        }

        let since = watermark(&self.ledger, config).await?;
        let files = self.unconsumed_files(since).await?;
        if files.is_empty() {
            info!(%since, "no new delta files");
            return Ok(DeltaOutcome::UpToDate { since });
        }

        let job = match self.ledger.create_job(&config.delta_sync_operation, &config.job_creator).await {
            Ok(job) => job,
            Err(LedgerError::AlreadyRunning { job, .. }) => {
                warn!(%job, "delta sync job already running");
                return Ok(DeltaOutcome::AlreadyRunning { job });
            }
            Err(e) => return Err(e.into()),
        };

        match self.ingest(&job, &files).await {
            Ok(()) => {
                self.ledger.update_status(&job.uri(), Status::Success).await?;
                Ok(DeltaOutcome::Ingested { job: job.uri(), files: files.len() })
            }
            Err(e) => {
                self.fail(&job.uri(), &e.to_string()).await?;
                Err(SyncError::JobFailed { job: job.uri(), source: Box::new(e) })
            }
        }
    }

    /// Mark `uri` failed, then attach `message` to it. The status is written
    /// first so a failing error write cannot leave the resource busy.
    async fn fail(&self, uri: &str, message: &str) -> Result<(), LedgerError> {
        self.ledger.update_status(uri, Status::Failed).await?;
        if let Err(e) = self.ledger.record_error_for(uri, message).await {
            error!(%uri, error = %e, "could not record error");
        }
        Ok(())
    }

    /// Files created after `since`, oldest first.
    async fn unconsumed_files(&self, since: DateTime<Utc>) -> Result<Vec<DeltaFile>, SyncError> {
        let mut files = self.producer.list_files(since).await?;
        files.retain(|f| f.created > since);
        sort_by_created(&mut files);
        info!(%since, count = files.len(), "fetched delta file list");
        Ok(files)
    }

    async fn ingest(&self, job: &Job, files: &[DeltaFile]) -> Result<(), SyncError> {
        let mut parent: Option<Task> = None;
        for (index, file) in files.iter().enumerate() {
            info!(job = %job.uri(), file = %file.id, created = %file.created, "ingesting delta file");
            let task = self
                .ledger
                .create_delta_sync_task(job, index, Status::Busy, file, parent.as_ref())
                .await?;
            if let Err(e) = self.ingest_file(file).await {
                error!(task = %task.uri(), file = %file.id, error = %e, "delta file failed");
                if let Err(status) = self.fail(&task.uri(), &e.to_string()).await {
                    error!(task = %task.uri(), error = %status, "could not fail delta sync task");
                }
                return Err(SyncError::DeltaFile { id: file.id.clone(), source: Box::new(e) });
            }
            self.ledger.update_status(&task.uri(), Status::Success).await?;
            parent = Some(task);
        }
        Ok(())
    }

    async fn ingest_file(&self, file: &DeltaFile) -> Result<(), SyncError> {
        let path = file.local_path(&self.config.delta_file_folder);
        self.producer.download(&file.id, &path).await?;
        self.apply_file(file, &path).await?;
        if !self.config.keep_delta_files {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "could not remove consumed delta file");
            }
        }
        Ok(())
    }

    async fn apply_file(&self, file: &DeltaFile, path: &Path) -> Result<(), SyncError> {
        let body = tokio::fs::read(path)
            .await
            .map_err(|source| SyncError::Io { path: path.to_path_buf(), source })?;
        let change_sets = parse_change_sets(&body)
            .map_err(|source| SyncError::Decode { id: file.id.clone(), source })?;
        for change_set in change_sets {
            let change_set = self.dispatcher.dispatch(change_set);
            apply_change_set(self.ledger.updater(), &self.config, change_set).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
