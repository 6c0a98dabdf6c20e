// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Triple store seam.
//!
//! Writes are graph-scoped `INSERT DATA` / `DELETE DATA` statements; reads are
//! single triple patterns or a [`Select`] over one graph.

use async_trait::async_trait;
use thiserror::Error;

use crate::select::{Row, Select};
use crate::term::{Pattern, Triple};

/// Header carrying the call scope; writes tagged with a scope are not
/// propagated as deltas downstream.
pub const SCOPE_HEADER: &str = "mu-call-scope-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    Insert,
    Delete,
}

crate::simple_display! {
    UpdateMode {
        Insert => "insert",
        Delete => "delete",
    }
}

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Transport(String),
    #[error("store rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// Adapter for a SPARQL triple store
#[async_trait]
pub trait TripleStore: Clone + Send + Sync + 'static {
    /// Insert or delete exactly `triples` in `graph`.
    async fn update(
        &self,
        graph: &str,
        mode: UpdateMode,
        triples: &[Triple],
        scope: Option<&str>,
    ) -> Result<(), StoreError>;

    /// All stored triples matching `pattern`, each tagged with its graph.
    async fn select(&self, pattern: &Pattern) -> Result<Vec<Triple>, StoreError>;

    /// Solutions of `query`, in one round trip.
    async fn query(&self, query: &Select) -> Result<Vec<Row>, StoreError>;
}
