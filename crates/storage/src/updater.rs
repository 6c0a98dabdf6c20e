// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batched, retrying writes to the triple store.
//!
//! Every write in the service goes through here: statements are split into
//! fixed-size batches, one update per batch, with a pause between batches.
//! A failed batch is retried after a fixed backoff; once the attempts are
//! used up the last store error is returned unchanged.

use dsync_core::{StoreError, Triple, TripleStore, UpdateMode};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Batching and retry knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdaterConfig {
    pub batch_size: usize,
    pub sleep_between_batches: Duration,
    /// Total attempts per batch, including the first
    pub max_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            sleep_between_batches: Duration::from_millis(1000),
            max_attempts: 5,
            retry_backoff: Duration::from_millis(60_000),
        }
    }
}

/// Run `op` until it succeeds or `max_attempts` attempts have failed,
/// sleeping `backoff` between attempts.
pub async fn with_retry<T, E, F, Fut>(
    label: &str,
    max_attempts: u32,
    backoff: Duration,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                warn!(%label, attempt, max_attempts, error = %e, "operation failed, retrying");
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                warn!(%label, attempt, error = %e, "operation failed, giving up");
                return Err(e);
            }
        }
    }
}

/// Batched writer over a [`TripleStore`].
#[derive(Clone)]
pub struct Updater<S> {
    store: S,
    config: UpdaterConfig,
}

impl<S: TripleStore> Updater<S> {
    pub fn new(store: S, config: UpdaterConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub async fn insert(
        &self,
        graph: &str,
        triples: &[Triple],
        scope: Option<&str>,
    ) -> Result<(), StoreError> {
        self.apply(graph, triples, UpdateMode::Insert, scope).await
    }

    pub async fn delete(
        &self,
        graph: &str,
        triples: &[Triple],
        scope: Option<&str>,
    ) -> Result<(), StoreError> {
        self.apply(graph, triples, UpdateMode::Delete, scope).await
    }

    /// Apply with the configured batch size.
    pub async fn apply(
        &self,
        graph: &str,
        statements: &[Triple],
        mode: UpdateMode,
        scope: Option<&str>,
    ) -> Result<(), StoreError> {
        self.apply_batched(graph, statements, mode, scope, self.config.batch_size).await
    }

    pub async fn apply_batched(
        &self,
        graph: &str,
        statements: &[Triple],
        mode: UpdateMode,
        scope: Option<&str>,
        batch_size: usize,
    ) -> Result<(), StoreError> {
        if statements.is_empty() {
            return Ok(());
        }
        let batches: Vec<&[Triple]> = statements.chunks(batch_size.max(1)).collect();
        let total = batches.len();
        for (i, batch) in batches.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.sleep_between_batches).await;
            }
            debug!(%graph, %mode, batch = i + 1, total, size = batch.len(), "applying batch");
            let label = format!("{mode} batch {}/{total} into {graph}", i + 1);
            with_retry(&label, self.config.max_attempts, self.config.retry_backoff, || {
                self.store.update(graph, mode, batch, scope)
            })
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "updater_tests.rs"]
mod tests;
