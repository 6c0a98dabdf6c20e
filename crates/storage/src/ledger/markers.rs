// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TaskFailure markers.
//!
//! A marker `?subject a ext:TaskFailure` lives next to the staged file
//! metadata it quarantines, not in the jobs graph.

use dsync_core::vocab::{self, types};
use dsync_core::{Clock, Pattern, Term, Triple, TripleStore};
use std::collections::HashSet;
use tracing::warn;

use super::{Ledger, LedgerError};
use crate::resource::subjects;

impl<S: TripleStore, C: Clock> Ledger<S, C> {
    pub async fn mark_task_failure(&self, graph: &str, subject: &str) -> Result<(), LedgerError> {
        warn!(%subject, %graph, "quarantining subject after permanent failure");
        let marker = Triple::new(Term::uri(subject), vocab::RDF_TYPE, Term::uri(types::TASK_FAILURE));
        self.updater().insert(graph, &[marker], self.config.scope.as_deref()).await?;
        Ok(())
    }

    /// Subjects quarantined in `graph`.
    pub async fn failed_subjects(&self, graph: &str) -> Result<HashSet<String>, LedgerError> {
        let pattern = Pattern::in_graph(graph)
            .predicate(vocab::RDF_TYPE)
            .object(Term::uri(types::TASK_FAILURE));
        Ok(subjects(self.store(), &pattern).await?.into_iter().collect())
    }
}
