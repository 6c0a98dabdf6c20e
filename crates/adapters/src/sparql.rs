// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SPARQL 1.1 protocol client.
//!
//! Updates are sent as form-encoded `update=` bodies and queries as `query=`
//! bodies with JSON results, both POSTed to the same endpoint.

use async_trait::async_trait;
use dsync_core::{Pattern, Row, Select, StoreError, Triple, TripleStore, UpdateMode, SCOPE_HEADER};
use std::time::Duration;
use tracing::debug;

use crate::query::{data_update, select_query, QueryBuilder, SelectResults};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const RESULTS_JSON: &str = "application/sparql-results+json";

/// [`TripleStore`] backed by a SPARQL endpoint over HTTP.
#[derive(Clone, Debug)]
pub struct SparqlStore {
    client: reqwest::Client,
    endpoint: String,
}

impl SparqlStore {
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(
        &self,
        field: &str,
        body: &str,
        scope: Option<&str>,
    ) -> Result<reqwest::Response, StoreError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, RESULTS_JSON)
            .form(&[(field, body)]);
        if let Some(scope) = scope {
            request = request.header(SCOPE_HEADER, scope);
        }
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("{} failed: {e}", self.endpoint)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected { status: status.as_u16(), body })
    }
}

#[async_trait]
impl TripleStore for SparqlStore {
    async fn update(
        &self,
        graph: &str,
        mode: UpdateMode,
        triples: &[Triple],
        scope: Option<&str>,
    ) -> Result<(), StoreError> {
        if triples.is_empty() {
            return Ok(());
        }
        let text = data_update(mode, graph, triples);
        debug!(%graph, %mode, count = triples.len(), "sending update");
        self.post("update", &text, scope).await?;
        Ok(())
    }

    async fn select(&self, pattern: &Pattern) -> Result<Vec<Triple>, StoreError> {
        let query = QueryBuilder::new().select(pattern);
        let response = self.post("query", &query.text, None).await?;
        let results: SelectResults =
            response.json().await.map_err(|e| StoreError::Malformed(e.to_string()))?;
        results.results.bindings.iter().map(|row| query.bind(row)).collect()
    }

    async fn query(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        let text = select_query(query);
        debug!(graph = %query.graph, clauses = query.clauses.len(), "sending select");
        let response = self.post("query", &text, None).await?;
        let results: SelectResults =
            response.json().await.map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(results.results.bindings.into_iter().map(|row| row.into_iter().collect()).collect())
    }
}
