// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use dsync_core::{ChangeSet, StoreError, Triple, TripleStore};
use dsync_storage::Updater;
use indexmap::IndexMap;
use tracing::debug;

use crate::config::SyncConfig;

/// Triples of one change set grouped by destination.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Partition {
    /// Regular deletes per target graph, in first-seen order
    pub deletes: IndexMap<String, Vec<Triple>>,
    /// Regular inserts per target graph, in first-seen order
    pub inserts: IndexMap<String, Vec<Triple>>,
    /// File metadata to stage for the add/update workflows
    pub file_inserts: Vec<Triple>,
    /// File metadata to stage for the remove workflow
    pub file_deletes: Vec<Triple>,
}

fn is_file_triple(triple: &Triple, config: &SyncConfig) -> bool {
    triple.subject.as_uri().is_some_and(|s| config.is_file_subject(s))
}

fn group(map: &mut IndexMap<String, Vec<Triple>>, triple: Triple, default_graph: &str) {
    let graph = triple.graph_uri().unwrap_or(default_graph).to_string();
    map.entry(graph).or_default().push(triple);
}

/// Split a (dispatched) change set. Triples without a graph go to the
/// ingest graph.
pub fn partition(change_set: ChangeSet, config: &SyncConfig) -> Partition {
    let mut out = Partition::default();
    for triple in change_set.deletes {
        if is_file_triple(&triple, config) {
            out.file_deletes.push(triple);
        } else {
            group(&mut out.deletes, triple, &config.ingest_graph);
        }
    }
    for triple in change_set.inserts {
        if is_file_triple(&triple, config) {
            out.file_inserts.push(triple);
        } else {
            group(&mut out.inserts, triple, &config.ingest_graph);
        }
    }
    out
}

/// Apply one change set: regular deletes, then regular inserts, then stage
/// file metadata. Regular writes carry no scope so they propagate
/// downstream; staging writes carry the file-sync scope.
pub async fn apply_change_set<S: TripleStore>(
    updater: &Updater<S>,
    config: &SyncConfig,
    change_set: ChangeSet,
) -> Result<(), StoreError> {
    let parts = partition(change_set, config);
    for (graph, triples) in &parts.deletes {
        updater.delete(graph, triples, None).await?;
    }
    for (graph, triples) in &parts.inserts {
        updater.insert(graph, triples, None).await?;
    }
    let file_scope = config.file_scope.as_deref();
    updater.insert(&config.temp_file_graph, &parts.file_inserts, file_scope).await?;
    updater.insert(&config.temp_file_removal_graph, &parts.file_deletes, file_scope).await?;
    debug!(
        deletes = parts.deletes.values().map(Vec::len).sum::<usize>(),
        inserts = parts.inserts.values().map(Vec::len).sum::<usize>(),
        staged = parts.file_inserts.len(),
        staged_removals = parts.file_deletes.len(),
        "applied change set"
    );
    Ok(())
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;
