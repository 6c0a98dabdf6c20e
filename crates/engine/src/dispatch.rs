// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change-set transform applied before triples reach the store.
//!
//! A deployment picks a strategy by name at startup. Strategies are
//! registered in a [`DispatcherRegistry`]; custom ones are registered
//! alongside the built-ins or injected directly into the pipeline.

use dsync_core::{ChangeSet, Triple};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Rewrites a change set before it is partitioned and applied.
///
/// Implementations may retarget graphs or drop triples. Triples left
/// without a graph are written to the ingest graph.
pub trait Dispatcher: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn dispatch(&self, change_set: ChangeSet) -> ChangeSet;
}

/// Moves every insert and delete into one graph.
#[derive(Debug, Clone)]
pub struct SingleGraphDispatcher {
    graph: String,
}

impl SingleGraphDispatcher {
    pub const NAME: &'static str = "single-graph";

    pub fn new(graph: impl Into<String>) -> Self {
        Self { graph: graph.into() }
    }
}

impl Dispatcher for SingleGraphDispatcher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn dispatch(&self, change_set: ChangeSet) -> ChangeSet {
        let retarget = |triples: Vec<Triple>| -> Vec<Triple> {
            triples.into_iter().map(|t| t.in_graph(&self.graph)).collect()
        };
        ChangeSet { inserts: retarget(change_set.inserts), deletes: retarget(change_set.deletes) }
    }
}

/// Keeps the graphs announced by the producer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughDispatcher;

impl PassthroughDispatcher {
    pub const NAME: &'static str = "passthrough";
}

impl Dispatcher for PassthroughDispatcher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn dispatch(&self, change_set: ChangeSet) -> ChangeSet {
        change_set
    }
}

type Factory = Box<dyn Fn(&str) -> Arc<dyn Dispatcher> + Send + Sync>;

/// Named dispatcher constructors. Each factory receives the ingest graph.
pub struct DispatcherRegistry {
    factories: BTreeMap<String, Factory>,
}

impl Default for DispatcherRegistry {
    fn default() -> Self {
        let mut registry = Self { factories: BTreeMap::new() };
        registry.register(SingleGraphDispatcher::NAME, |graph| {
            Arc::new(SingleGraphDispatcher::new(graph))
        });
        registry.register(PassthroughDispatcher::NAME, |_| Arc::new(PassthroughDispatcher));
        registry
    }
}

impl DispatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&str) -> Arc<dyn Dispatcher> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the dispatcher registered as `name`, falling back to
    /// [`SingleGraphDispatcher`] when `name` is unset or unknown.
    pub fn resolve(&self, name: Option<&str>, ingest_graph: &str) -> Arc<dyn Dispatcher> {
        let requested = name.unwrap_or(SingleGraphDispatcher::NAME);
        let dispatcher = match self.factories.get(requested) {
            Some(factory) => factory(ingest_graph),
            None => {
                let known: Vec<&str> = self.names().collect();
                warn!(requested, ?known, "unknown dispatch strategy, using single-graph");
                Arc::new(SingleGraphDispatcher::new(ingest_graph))
            }
        };
        info!(strategy = dispatcher.name(), "dispatch strategy resolved");
        dispatcher
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
