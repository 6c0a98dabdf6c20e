// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job/Task ledger persisted as RDF in the jobs graph.
//!
//! The ledger is the only record of what has been consumed, so every write
//! returns its error to the caller. Reads rebuild records from the stored
//! triples each time; nothing is cached between calls.

mod errors;
mod file_tasks;
mod jobs;
mod markers;

use chrono::{DateTime, Utc};
use dsync_core::{Clock, IdGen, Status, StoreError, Triple, TripleStore};
use std::sync::Arc;
use thiserror::Error;

use crate::updater::Updater;

/// Errors from ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("job {job} is already busy for operation {operation}")]
    AlreadyRunning { operation: String, job: String },
    #[error("{uri} is {current} and cannot become {requested}")]
    TerminalStatus { uri: String, current: Status, requested: Status },
    #[error("{uri} has no readable status")]
    MissingStatus { uri: String },
    #[error("{uri} is malformed: {reason}")]
    Malformed { uri: String, reason: String },
}

/// Where and how the ledger writes
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub jobs_graph: String,
    /// Prefix for standalone error messages (`[service] message`)
    pub service_name: String,
    /// Scope attached to every ledger write
    pub scope: Option<String>,
}

/// Ledger over a triple store.
#[derive(Clone)]
pub struct Ledger<S, C> {
    updater: Updater<S>,
    clock: C,
    ids: Arc<dyn IdGen>,
    config: LedgerConfig,
}

impl<S: TripleStore, C: Clock> Ledger<S, C> {
    pub fn new(updater: Updater<S>, clock: C, ids: Arc<dyn IdGen>, config: LedgerConfig) -> Self {
        Self { updater, clock, ids, config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn updater(&self) -> &Updater<S> {
        &self.updater
    }

    pub(crate) fn store(&self) -> &S {
        self.updater.store()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn next_id(&self) -> String {
        self.ids.next()
    }

    fn scope(&self) -> Option<&str> {
        self.config.scope.as_deref()
    }

    pub(crate) async fn insert(&self, triples: &[Triple]) -> Result<(), StoreError> {
        self.updater.insert(&self.config.jobs_graph, triples, self.scope()).await
    }

    pub(crate) async fn delete(&self, triples: &[Triple]) -> Result<(), StoreError> {
        self.updater.delete(&self.config.jobs_graph, triples, self.scope()).await
    }
}
