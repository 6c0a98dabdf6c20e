// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads of staged file metadata.

use dsync_core::vocab::{self, types};
use dsync_core::{Pattern, StoreError, Term, Triple, TripleStore};
use dsync_storage::{describe, subjects, Resource};

/// Virtual and physical description of one file within a graph.
#[derive(Debug, Clone)]
pub(crate) struct FileDescription {
    pub vuri: String,
    pub puri: String,
    pub virtual_file: Resource,
    pub physical_file: Resource,
}

fn is_complete(r: &Resource) -> bool {
    r.has_type(types::FILE_DATA_OBJECT) && vocab::FILE_METADATA_PREDICATES.iter().all(|p| r.has(p))
}

impl FileDescription {
    pub fn vuuid(&self) -> Option<&str> {
        self.virtual_file.first(vocab::MU_UUID).map(Term::value)
    }

    /// Both identities carry every metadata predicate.
    pub fn is_complete(&self) -> bool {
        is_complete(&self.virtual_file) && is_complete(&self.physical_file)
    }

    pub fn triples(&self) -> Vec<Triple> {
        let mut all = self.virtual_file.triples();
        all.extend(self.physical_file.triples());
        all
    }
}

/// Physical file in `graph` whose data source is `vuri`.
pub(crate) async fn physical_of<S: TripleStore>(
    store: &S,
    graph: &str,
    vuri: &str,
) -> Result<Option<String>, StoreError> {
    let pattern = Pattern::in_graph(graph).predicate(vocab::NIE_DATA_SOURCE).object(Term::uri(vuri));
    Ok(subjects(store, &pattern).await?.into_iter().next())
}

pub(crate) async fn load<S: TripleStore>(
    store: &S,
    graph: &str,
    vuri: &str,
) -> Result<Option<FileDescription>, StoreError> {
    let Some(puri) = physical_of(store, graph, vuri).await? else {
        return Ok(None);
    };
    Ok(Some(FileDescription {
        vuri: vuri.to_string(),
        virtual_file: describe(store, graph, vuri).await?,
        physical_file: describe(store, graph, &puri).await?,
        puri,
    }))
}

/// Virtual files in `graph` that have a uuid and a physical file
/// pointing at them.
pub(crate) async fn staged_files<S: TripleStore>(
    store: &S,
    graph: &str,
) -> Result<Vec<String>, StoreError> {
    let links = store.select(&Pattern::in_graph(graph).predicate(vocab::NIE_DATA_SOURCE)).await?;
    let mut vuris: Vec<String> = Vec::new();
    for link in links {
        let Some(vuri) = link.object.as_uri() else { continue };
        if vuris.iter().any(|v| v == vuri) {
            continue;
        }
        let uuid = Pattern::in_graph(graph).subject(Term::uri(vuri)).predicate(vocab::MU_UUID);
        if !store.select(&uuid).await?.is_empty() {
            vuris.push(vuri.to_string());
        }
    }
    Ok(vuris)
}

/// Identity in `graph` recorded as replacing `uri`.
pub(crate) async fn replaced_by<S: TripleStore>(
    store: &S,
    graph: &str,
    uri: &str,
) -> Result<Option<String>, StoreError> {
    let pattern = Pattern::in_graph(graph).predicate(vocab::DCT_REPLACES).object(Term::uri(uri));
    Ok(subjects(store, &pattern).await?.into_iter().next())
}

/// `uri`, or the identity that replaced it.
pub(crate) async fn current_identity<S: TripleStore>(
    store: &S,
    graph: &str,
    uri: &str,
) -> Result<String, StoreError> {
    Ok(replaced_by(store, graph, uri).await?.unwrap_or_else(|| uri.to_string()))
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
