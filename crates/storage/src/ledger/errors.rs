// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted error resources.

use dsync_core::vocab::{self, types};
use dsync_core::{Clock, ErrorId, Term, Triple, TripleStore};
use tracing::error;

use super::{Ledger, LedgerError};

impl<S: TripleStore, C: Clock> Ledger<S, C> {
    fn error_triples(&self, id: &ErrorId, message: &str) -> Vec<Triple> {
        let uri = Term::uri(id.uri());
        vec![
            Triple::new(uri.clone(), vocab::RDF_TYPE, Term::uri(types::ERROR)),
            Triple::new(uri.clone(), vocab::RDF_TYPE, Term::uri(types::DELTA_ERROR)),
            Triple::new(uri.clone(), vocab::MU_UUID, Term::literal(id.as_str())),
            Triple::new(uri.clone(), vocab::OSLC_MESSAGE, Term::literal(message)),
            Triple::new(uri, vocab::DCT_CREATED, Term::date_time(self.now())),
        ]
    }

    /// Standalone error, for failures that happen before a Job exists.
    /// The message is prefixed with the service name.
    pub async fn record_error(&self, message: &str) -> Result<ErrorId, LedgerError> {
        let id = ErrorId::new(self.next_id());
        let message = format!("[{}] {message}", self.config.service_name);
        error!(error_id = %id, %message, "recording error");
        self.insert(&self.error_triples(&id, &message)).await?;
        Ok(id)
    }

    /// Error linked to a Job or Task through `task:error`.
    pub async fn record_error_for(&self, owner: &str, message: &str) -> Result<ErrorId, LedgerError> {
        let id = ErrorId::new(self.next_id());
        error!(%owner, error_id = %id, %message, "recording error");
        let mut triples = self.error_triples(&id, message);
        triples.push(Triple::new(Term::uri(owner), vocab::TASK_ERROR, Term::uri(id.uri())));
        self.insert(&triples).await?;
        Ok(id)
    }

    /// Messages of the errors linked to the Job or Task at `uri`.
    pub async fn error_messages(&self, uri: &str) -> Result<Vec<String>, LedgerError> {
        let graph = &self.config.jobs_graph;
        let owner = crate::resource::describe(self.store(), graph, uri).await?;
        let mut messages = Vec::new();
        for err in owner.uris(vocab::TASK_ERROR) {
            let r = crate::resource::describe(self.store(), graph, &err).await?;
            messages.extend(r.all(vocab::OSLC_MESSAGE).iter().map(|t| t.value().to_string()));
        }
        Ok(messages)
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
