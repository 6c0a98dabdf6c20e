// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-pattern reads.
//!
//! A [`Select`] is a basic graph pattern inside one graph, with membership
//! filters, one sort key and an optional limit. It lets the ledger answer
//! "latest X" and "all X with status Y" in a single round trip instead of
//! walking resources one `describe` at a time.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::term::{Term, Triple};

/// One solution: variable name (without `?`) to bound term.
pub type Row = BTreeMap<String, Term>;

/// Subject or object position of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Var(String),
    Term(Term),
}

impl Node {
    pub fn var(name: &str) -> Self {
        Node::Var(name.to_string())
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        Node::Term(Term::uri(uri))
    }

    /// Unify with `term` under `row`, extending the row on a fresh variable.
    fn unify(&self, term: &Term, row: &mut Row) -> bool {
        match self {
            Node::Term(bound) => bound == term,
            Node::Var(name) => match row.get(name) {
                Some(existing) => existing == term,
                None => {
                    row.insert(name.clone(), term.clone());
                    true
                }
            },
        }
    }
}

impl From<Term> for Node {
    fn from(term: Term) -> Self {
        Node::Term(term)
    }
}

/// `subject <predicate> object .`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub subject: Node,
    pub predicate: String,
    pub object: Node,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    In { var: String, terms: Vec<Term> },
    NotIn { var: String, terms: Vec<Term> },
}

impl Filter {
    fn keeps(&self, row: &Row) -> bool {
        match self {
            Filter::In { var, terms } => row.get(var).is_some_and(|t| terms.contains(t)),
            Filter::NotIn { var, terms } => row.get(var).map_or(true, |t| !terms.contains(t)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// `SELECT DISTINCT` over a basic graph pattern in one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    pub graph: String,
    /// Projected variables; every bound variable when empty
    pub vars: Vec<String>,
    pub clauses: Vec<Clause>,
    pub filters: Vec<Filter>,
    pub order: Option<(String, Order)>,
    pub limit: Option<usize>,
}

impl Select {
    pub fn in_graph(graph: impl Into<String>) -> Self {
        Self { graph: graph.into(), ..Self::default() }
    }

    pub fn vars(mut self, vars: &[&str]) -> Self {
        self.vars = vars.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn clause(mut self, subject: Node, predicate: &str, object: Node) -> Self {
        self.clauses.push(Clause { subject, predicate: predicate.to_string(), object });
        self
    }

    /// Keep rows whose `var` is one of `terms`. An empty list keeps nothing.
    pub fn one_of(mut self, var: &str, terms: impl IntoIterator<Item = Term>) -> Self {
        self.filters.push(Filter::In { var: var.to_string(), terms: terms.into_iter().collect() });
        self
    }

    pub fn none_of(mut self, var: &str, terms: impl IntoIterator<Item = Term>) -> Self {
        self.filters.push(Filter::NotIn { var: var.to_string(), terms: terms.into_iter().collect() });
        self
    }

    pub fn order_by(mut self, var: &str, order: Order) -> Self {
        self.order = Some((var.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate against the triples of [`Self::graph`].
    pub fn evaluate(&self, triples: &[&Triple]) -> Vec<Row> {
        let mut rows = vec![Row::new()];
        for clause in &self.clauses {
            let mut next = Vec::new();
            for row in &rows {
                for triple in triples.iter().filter(|t| t.predicate_uri() == clause.predicate) {
                    let mut candidate = row.clone();
                    if clause.subject.unify(&triple.subject, &mut candidate)
                        && clause.object.unify(&triple.object, &mut candidate)
                    {
                        next.push(candidate);
                    }
                }
            }
            rows = next;
        }

        rows.retain(|row| self.filters.iter().all(|f| f.keeps(row)));
        if !self.vars.is_empty() {
            for row in &mut rows {
                row.retain(|name, _| self.vars.contains(name));
            }
        }
        let mut seen = BTreeSet::new();
        rows.retain(|row| seen.insert(row.clone()));

        if let Some((var, order)) = &self.order {
            rows.sort_by(|a, b| {
                let ordering = match (a.get(var), b.get(var)) {
                    (Some(x), Some(y)) => compare_terms(x, y),
                    (x, y) => x.is_some().cmp(&y.is_some()),
                };
                match order {
                    Order::Asc => ordering,
                    Order::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

/// Timestamps chronologically, integers numerically, anything else by
/// lexical value.
pub fn compare_terms(a: &Term, b: &Term) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_date_time(), b.as_date_time()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_integer(), b.as_integer()) {
        return x.cmp(&y);
    }
    a.value().cmp(b.value())
}

#[cfg(test)]
#[path = "select_tests.rs"]
mod tests;
