// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File synchronization state machine.
//!
//! Each pass re-derives its work from the ledger: open tasks are resumed,
//! new tasks are scheduled from the staging graphs, and every task is
//! stepped until it finishes or has to wait for a later pass. Every stage
//! transition is saved before the next step runs. Tasks for different
//! files run concurrently; the stages of one file run in order.

mod add;
mod metadata;
mod remove;
mod share;
mod update;

use dsync_adapters::{ProducerAdapter, ProducerError};
use dsync_core::vocab::types;
use dsync_core::{Clock, FileTask, FileTaskKind, StageRegression, Status, StoreError, TripleStore};
use dsync_storage::{Ledger, LedgerError};
use futures_util::stream::{self, StreamExt};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::SyncConfig;

/// Errors from the file-sync machine
#[derive(Debug, Error)]
pub enum FileSyncError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Producer(#[from] ProducerError),
    #[error(transparent)]
    Stage(#[from] StageRegression),
    #[error("{uri} is not a share:// URI")]
    NotShareUri { uri: String },
    #[error("{uri} resolves outside of {folder}")]
    OutsideShare { uri: String, folder: PathBuf },
    #[error("no physical file for {vuri} in {graph}")]
    MissingPhysical { vuri: String, graph: String },
    #[error("{vuri} has no mu:uuid")]
    MissingUuid { vuri: String },
    #[error("refusing to overwrite {path}")]
    TargetExists { path: PathBuf },
    #[error("error {action} {path}: {source}")]
    Io { action: &'static str, path: PathBuf, source: std::io::Error },
}

/// Result of one step of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// A stage moved; step again
    Progressed,
    /// Nothing more to do until a later pass
    Waiting,
}

/// Counts from one file-sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSyncReport {
    pub disabled: bool,
    pub scheduled: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pending: usize,
    /// Tasks whose pass was cut short by a store or ledger error
    pub errored: usize,
}

impl fmt::Display for FileSyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disabled {
            return write!(f, "file ingest disabled");
        }
        write!(
            f,
            "scheduled={} succeeded={} failed={} pending={} errored={}",
            self.scheduled, self.succeeded, self.failed, self.pending, self.errored
        )
    }
}

/// Runs file-sync passes.
pub struct FileSync<S, P, C> {
    ledger: Ledger<S, C>,
    producer: P,
    config: Arc<SyncConfig>,
}

impl<S, P, C> FileSync<S, P, C>
where
    S: TripleStore,
    P: ProducerAdapter,
    C: Clock,
{
    pub fn new(ledger: Ledger<S, C>, producer: P, config: Arc<SyncConfig>) -> Self {
        Self { ledger, producer, config }
    }

    fn store(&self) -> &S {
        self.ledger.updater().store()
    }

    fn scope(&self) -> Option<&str> {
        self.config.file_scope.as_deref()
    }

    /// Run a pass and persist any failure. Never returns an error.
    pub async fn start(&self) -> FileSyncReport {
        match self.run().await {
            Ok(report) => {
                info!(%report, "file sync finished");
                report
            }
            Err(e) => {
                error!(error = %e, "file sync pass failed");
                if let Err(record) = self.ledger.record_error(&format!("File sync failed: {e}")).await {
                    error!(error = %record, "could not record file sync error");
                }
                FileSyncReport::default()
            }
        }
    }

    /// One pass over add, remove and update tasks, in that order.
    pub async fn run(&self) -> Result<FileSyncReport, FileSyncError> {
        let mut report = FileSyncReport::default();
        if self.config.disable_file_ingest {
            warn!("automated file ingest disabled");
            report.disabled = true;
            return Ok(report);
        }
        for type_uri in [types::FILE_ADD_TASK, types::FILE_REMOVE_TASK, types::FILE_UPDATE_TASK] {
            let mut tasks = self.ledger.open_file_tasks(type_uri).await?;
            let scheduled = match type_uri {
                types::FILE_ADD_TASK => add::schedule(self, &tasks).await?,
                types::FILE_REMOVE_TASK => remove::schedule(self, &tasks).await?,
                _ => update::schedule(self, &tasks).await?,
            };
            report.scheduled += scheduled.len();
            tasks.extend(scheduled);
            self.drive_all(tasks, &mut report).await;
        }
        Ok(report)
    }

    async fn drive_all(&self, tasks: Vec<FileTask>, report: &mut FileSyncReport) {
        let results: Vec<(String, Result<Status, FileSyncError>)> = stream::iter(tasks)
            .map(|task| async move {
                let uri = task.uri();
                (uri, self.drive(task).await)
            })
            .buffer_unordered(self.config.file_sync_concurrency.max(1))
            .collect()
            .await;
        for (uri, result) in results {
            match result {
                Ok(Status::Success) => report.succeeded += 1,
                Ok(Status::Failed) => report.failed += 1,
                Ok(_) => report.pending += 1,
                Err(e) => {
                    report.errored += 1;
                    error!(task = %uri, error = %e, "file task interrupted");
                    if let Err(record) = self.ledger.record_error_for(&uri, &e.to_string()).await {
                        error!(task = %uri, error = %record, "could not record file task error");
                    }
                }
            }
        }
    }

    /// Step `task` until it finishes or has to wait. Returns its status.
    async fn drive(&self, mut task: FileTask) -> Result<Status, FileSyncError> {
        if task.status == Status::Scheduled {
            let before = task.clone();
            task.status = Status::Busy;
            self.ledger.save_file_task(&before, &mut task).await?;
        }
        while task.kind.outcome().is_none() {
            let before = task.clone();
            let step = match task.kind {
                FileTaskKind::Add { .. } => add::step(self, &mut task).await?,
                FileTaskKind::Remove { .. } => remove::step(self, &mut task).await?,
                FileTaskKind::Update { .. } => update::step(self, &mut task).await?,
            };
            self.ledger.save_file_task(&before, &mut task).await?;
            if step == Step::Waiting {
                break;
            }
        }
        if let Some(outcome) = task.kind.outcome() {
            self.finish(&mut task, outcome).await?;
        }
        Ok(task.status)
    }

    async fn finish(&self, task: &mut FileTask, outcome: Status) -> Result<(), FileSyncError> {
        if outcome == Status::Failed {
            let graph = match task.kind {
                FileTaskKind::Remove { .. } => &self.config.temp_file_removal_graph,
                _ => &self.config.temp_file_graph,
            };
            self.ledger.mark_task_failure(graph, &task.subject).await?;
        }
        let before = task.clone();
        task.status = outcome;
        self.ledger.save_file_task(&before, task).await?;
        info!(task = %task.uri(), subject = %task.subject, kind = %task.kind, status = %outcome, "file task finished");
        Ok(())
    }

    /// Persist a stage error against the task.
    async fn record_stage_error(
        &self,
        task_uri: &str,
        stage: &str,
        err: &FileSyncError,
    ) -> Result<(), FileSyncError> {
        warn!(task = %task_uri, stage, error = %err, "file task stage failed");
        self.ledger.record_error_for(task_uri, &format!("{stage}: {err}")).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
