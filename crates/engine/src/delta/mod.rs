// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta fetch and apply pipeline.
//!
//! Delta files are applied strictly in creation order, one Task per file,
//! chained to the previous file's Task. The first failing file stops the
//! Job; files applied before it keep their successful Tasks, so the next
//! run resumes right after them.

mod apply;
mod pipeline;
mod watermark;

pub use apply::{apply_change_set, partition, Partition};
pub use pipeline::DeltaSync;
pub use watermark::watermark;

use chrono::{DateTime, Utc};
use dsync_adapters::ProducerError;
use dsync_core::StoreError;
use dsync_storage::LedgerError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a delta sync run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Producer(#[from] ProducerError),
    #[error("no successful delta task found and no start timestamp configured")]
    NoWatermark,
    #[error("cannot read delta file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("delta file {id} is not a valid change set list: {source}")]
    Decode { id: String, source: serde_json::Error },
    #[error("delta file {id}: {source}")]
    DeltaFile { id: String, source: Box<SyncError> },
    #[error("job {job} failed: {source}")]
    JobFailed { job: String, source: Box<SyncError> },
}

/// What a delta sync trigger did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOutcome {
    Disabled,
    /// Waiting for a successful initial-sync Job
    AwaitingInitialSync,
    UpToDate { since: DateTime<Utc> },
    AlreadyRunning { job: String },
    Ingested { job: String, files: usize },
    Failed { job: Option<String>, error: String },
}

impl fmt::Display for DeltaOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaOutcome::Disabled => write!(f, "delta ingest disabled"),
            DeltaOutcome::AwaitingInitialSync => write!(f, "waiting for initial sync"),
            DeltaOutcome::UpToDate { since } => write!(f, "no delta files since {since}"),
            DeltaOutcome::AlreadyRunning { job } => write!(f, "job {job} already running"),
            DeltaOutcome::Ingested { job, files } => write!(f, "job {job} ingested {files} file(s)"),
            DeltaOutcome::Failed { job: Some(job), error } => write!(f, "job {job} failed: {error}"),
            DeltaOutcome::Failed { job: None, error } => write!(f, "failed: {error}"),
        }
    }
}
