// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`TripleStore`] for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::select::{Row, Select};
use crate::store::{StoreError, TripleStore, UpdateMode};
use crate::term::{Pattern, Term, Triple};

/// Recorded update call
#[derive(Debug, Clone)]
pub struct UpdateCall {
    pub graph: String,
    pub mode: UpdateMode,
    pub triples: Vec<Triple>,
    pub scope: Option<String>,
}

#[derive(Default)]
struct MemoryState {
    quads: BTreeSet<(String, Triple)>,
    calls: Vec<UpdateCall>,
    fail_updates: u32,
    rejected_predicates: Vec<String>,
    reads: usize,
}

/// Quad set behind a mutex, with failure injection for updates.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

fn untagged(triple: &Triple) -> Triple {
    Triple { graph: None, ..triple.clone() }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert triples directly, bypassing call recording.
    pub fn seed(&self, graph: &str, triples: impl IntoIterator<Item = Triple>) {
        let mut state = self.inner.lock();
        for t in triples {
            state.quads.insert((graph.to_string(), untagged(&t)));
        }
    }

    /// Make the next `n` updates fail with a transport error.
    pub fn fail_next_updates(&self, n: u32) {
        self.inner.lock().fail_updates = n;
    }

    /// Fail every update carrying a triple with `predicate`, until cleared.
    pub fn reject_predicate(&self, predicate: &str) {
        self.inner.lock().rejected_predicates.push(predicate.to_string());
    }

    pub fn clear_rejections(&self) {
        self.inner.lock().rejected_predicates.clear();
    }

    /// Number of `select` and `query` round trips so far.
    pub fn reads(&self) -> usize {
        self.inner.lock().reads
    }

    pub fn calls(&self) -> Vec<UpdateCall> {
        self.inner.lock().calls.clone()
    }

    pub fn contains(&self, graph: &str, subject: &Term, predicate: &str, object: &Term) -> bool {
        let triple = Triple::new(subject.clone(), predicate, object.clone());
        self.inner.lock().quads.contains(&(graph.to_string(), triple))
    }

    /// Triples stored in `graph`, untagged, in sorted order.
    pub fn graph(&self, graph: &str) -> Vec<Triple> {
        self.inner
            .lock()
            .quads
            .iter()
            .filter(|(g, _)| g == graph)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().quads.is_empty()
    }
}

#[async_trait]
impl TripleStore for MemoryStore {
    async fn update(
        &self,
        graph: &str,
        mode: UpdateMode,
        triples: &[Triple],
        scope: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        state.calls.push(UpdateCall {
            graph: graph.to_string(),
            mode,
            triples: triples.to_vec(),
            scope: scope.map(str::to_string),
        });
        if state.fail_updates > 0 {
            state.fail_updates -= 1;
            return Err(StoreError::Transport("injected failure".to_string()));
        }
        if triples.iter().any(|t| state.rejected_predicates.iter().any(|p| p == t.predicate_uri())) {
            return Err(StoreError::Rejected { status: 500, body: "injected rejection".to_string() });
        }
        for t in triples {
            let key = (graph.to_string(), untagged(t));
            match mode {
                UpdateMode::Insert => state.quads.insert(key),
                UpdateMode::Delete => state.quads.remove(&key),
            };
        }
        Ok(())
    }

    async fn select(&self, pattern: &Pattern) -> Result<Vec<Triple>, StoreError> {
        let mut state = self.inner.lock();
        state.reads += 1;
        Ok(state
            .quads
            .iter()
            .filter(|(g, t)| pattern.matches(g, t))
            .map(|(g, t)| t.clone().in_graph(g.clone()))
            .collect())
    }

    async fn query(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        let mut state = self.inner.lock();
        state.reads += 1;
        let triples: Vec<&Triple> =
            state.quads.iter().filter(|(g, _)| *g == query.graph).map(|(_, t)| t).collect();
        Ok(query.evaluate(&triples))
    }
}

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;
