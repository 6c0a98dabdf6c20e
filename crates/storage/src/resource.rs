// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subject-centric view over stored triples.

use dsync_core::{Pattern, StoreError, Term, Triple, TripleStore};
use std::collections::BTreeMap;

use dsync_core::vocab::RDF_TYPE;

/// All predicate/object pairs of one subject in one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub uri: String,
    props: BTreeMap<String, Vec<Term>>,
}

impl Resource {
    pub fn from_triples(uri: impl Into<String>, triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut props: BTreeMap<String, Vec<Term>> = BTreeMap::new();
        for t in triples {
            let values = props.entry(t.predicate_uri().to_string()).or_default();
            if !values.contains(&t.object) {
                values.push(t.object);
            }
        }
        Self { uri: uri.into(), props }
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn first(&self, predicate: &str) -> Option<&Term> {
        self.props.get(predicate).and_then(|v| v.first())
    }

    pub fn all(&self, predicate: &str) -> &[Term] {
        self.props.get(predicate).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn first_uri(&self, predicate: &str) -> Option<&str> {
        self.all(predicate).iter().find_map(Term::as_uri)
    }

    pub fn uris(&self, predicate: &str) -> Vec<String> {
        self.all(predicate).iter().filter_map(Term::as_uri).map(str::to_string).collect()
    }

    pub fn has(&self, predicate: &str) -> bool {
        !self.all(predicate).is_empty()
    }

    pub fn has_type(&self, type_uri: &str) -> bool {
        self.all(RDF_TYPE).iter().any(|t| t.as_uri() == Some(type_uri))
    }

    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    /// The description as untagged triples.
    pub fn triples(&self) -> Vec<Triple> {
        self.props
            .iter()
            .flat_map(|(p, objects)| {
                objects.iter().map(|o| Triple::new(Term::uri(self.uri.clone()), p.clone(), o.clone()))
            })
            .collect()
    }

    /// Only the statements for `predicate`.
    pub fn triples_for(&self, predicate: &str) -> Vec<Triple> {
        self.all(predicate)
            .iter()
            .map(|o| Triple::new(Term::uri(self.uri.clone()), predicate, o.clone()))
            .collect()
    }
}

/// Everything stored about `uri` in `graph`.
pub async fn describe<S: TripleStore>(
    store: &S,
    graph: &str,
    uri: &str,
) -> Result<Resource, StoreError> {
    let triples = store.select(&Pattern::in_graph(graph).subject(Term::uri(uri))).await?;
    Ok(Resource::from_triples(uri, triples))
}

/// Distinct URI subjects matching `pattern`, in first-seen order.
pub async fn subjects<S: TripleStore>(store: &S, pattern: &Pattern) -> Result<Vec<String>, StoreError> {
    let mut seen = Vec::new();
    for t in store.select(pattern).await? {
        if let Some(uri) = t.subject.as_uri() {
            if !seen.iter().any(|s: &String| s == uri) {
                seen.push(uri.to_string());
            }
        }
    }
    Ok(seen)
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
