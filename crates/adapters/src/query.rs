// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SPARQL text generation.
//!
//! Variables are numbered per builder, so two queries built concurrently
//! never share names and a rebuilt query is byte-identical.

use dsync_core::select::Filter;
use dsync_core::{Node, Order, Pattern, Select, StoreError, Term, Triple, UpdateMode};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Write;

/// Render an `INSERT DATA` / `DELETE DATA` request scoped to one graph.
///
/// `DELETE DATA` may not contain blank nodes, so a delete carrying any is
/// sent as `DELETE WHERE` with each blank node label turned into a variable.
pub fn data_update(mode: UpdateMode, graph: &str, triples: &[Triple]) -> String {
    let bnodes = mode == UpdateMode::Delete && triples.iter().any(has_bnode);
    let verb = match mode {
        UpdateMode::Insert => "INSERT DATA",
        UpdateMode::Delete if bnodes => "DELETE WHERE",
        UpdateMode::Delete => "DELETE DATA",
    };
    let mut out = format!("{verb} {{\n  GRAPH {} {{\n", Term::uri(graph).to_sparql());
    for t in triples {
        if bnodes {
            let _ = writeln!(
                out,
                "    {} {} {} .",
                bnode_var(&t.subject),
                t.predicate.to_sparql(),
                bnode_var(&t.object)
            );
        } else {
            let _ = writeln!(out, "    {}", t.to_sparql());
        }
    }
    out.push_str("  }\n}");
    out
}

fn has_bnode(t: &Triple) -> bool {
    matches!(t.subject, Term::Bnode(_)) || matches!(t.object, Term::Bnode(_))
}

fn bnode_var(term: &Term) -> String {
    match term {
        Term::Bnode(label) => {
            let name: String =
                label.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }).collect();
            format!("?b_{name}")
        }
        other => other.to_sparql(),
    }
}

/// Render a [`Select`] as `SELECT DISTINCT ... WHERE { GRAPH <g> { ... } }`.
pub fn select_query(select: &Select) -> String {
    let node = |n: &Node| match n {
        Node::Var(name) => format!("?{name}"),
        Node::Term(term) => term.to_sparql(),
    };
    let terms = |terms: &[Term]| terms.iter().map(Term::to_sparql).collect::<Vec<_>>().join(", ");

    let projection = if select.vars.is_empty() {
        "*".to_string()
    } else {
        select.vars.iter().map(|v| format!("?{v}")).collect::<Vec<_>>().join(" ")
    };
    let mut out = format!(
        "SELECT DISTINCT {projection} WHERE {{\n  GRAPH {} {{\n",
        Term::uri(&select.graph).to_sparql()
    );
    for clause in &select.clauses {
        let _ = writeln!(
            out,
            "    {} {} {} .",
            node(&clause.subject),
            Term::uri(&clause.predicate).to_sparql(),
            node(&clause.object)
        );
    }
    out.push_str("  }\n");
    for filter in &select.filters {
        let _ = match filter {
            Filter::In { var, terms: list } => writeln!(out, "  FILTER(?{var} IN ({}))", terms(list.as_slice())),
            Filter::NotIn { var, terms: list } => {
                writeln!(out, "  FILTER(?{var} NOT IN ({}))", terms(list.as_slice()))
            }
        };
    }
    out.push('}');
    if let Some((var, order)) = &select.order {
        let _ = match order {
            Order::Asc => write!(out, "\nORDER BY ASC(?{var})"),
            Order::Desc => write!(out, "\nORDER BY DESC(?{var})"),
        };
    }
    if let Some(limit) = select.limit {
        let _ = write!(out, "\nLIMIT {limit}");
    }
    out
}

/// One position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Bound(Term),
    Var(String),
}

impl Slot {
    fn render(&self) -> String {
        match self {
            Slot::Bound(term) => term.to_sparql(),
            Slot::Var(name) => format!("?{name}"),
        }
    }

    fn resolve(&self, row: &HashMap<String, Term>) -> Result<Term, StoreError> {
        match self {
            Slot::Bound(term) => Ok(term.clone()),
            Slot::Var(name) => row
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::Malformed(format!("binding for ?{name} missing"))),
        }
    }
}

/// Allocates fresh variable names for one query.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    next_var: usize,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused variable name (without `?`).
    pub fn var(&mut self) -> String {
        let name = format!("v{}", self.next_var);
        self.next_var += 1;
        name
    }

    fn slot(&mut self, bound: Option<Term>) -> Slot {
        match bound {
            Some(term) => Slot::Bound(term),
            None => Slot::Var(self.var()),
        }
    }

    /// `SELECT DISTINCT` over a single triple pattern.
    pub fn select(mut self, pattern: &Pattern) -> SelectQuery {
        let graph = self.slot(pattern.graph.clone().map(Term::Uri));
        let subject = self.slot(pattern.subject.clone());
        let predicate = self.slot(pattern.predicate.clone().map(Term::Uri));
        let object = self.slot(pattern.object.clone());

        let vars: Vec<String> = [&graph, &subject, &predicate, &object]
            .iter()
            .filter_map(|s| match s {
                Slot::Var(name) => Some(format!("?{name}")),
                Slot::Bound(_) => None,
            })
            .collect();
        let projection = if vars.is_empty() { "*".to_string() } else { vars.join(" ") };
        let text = format!(
            "SELECT DISTINCT {projection} WHERE {{\n  GRAPH {} {{\n    {} {} {} .\n  }}\n}}",
            graph.render(),
            subject.render(),
            predicate.render(),
            object.render()
        );
        SelectQuery { text, graph, subject, predicate, object }
    }
}

/// A rendered pattern query that can turn result rows back into triples.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub text: String,
    graph: Slot,
    subject: Slot,
    predicate: Slot,
    object: Slot,
}

impl SelectQuery {
    /// Rebuild the graph-tagged triple from one result row.
    pub fn bind(&self, row: &HashMap<String, Term>) -> Result<Triple, StoreError> {
        let graph = self.graph.resolve(row)?;
        Ok(Triple {
            subject: self.subject.resolve(row)?,
            predicate: self.predicate.resolve(row)?,
            object: self.object.resolve(row)?,
            graph: Some(graph),
        })
    }
}

/// `application/sparql-results+json` body.
#[derive(Debug, Deserialize)]
pub struct SelectResults {
    pub results: Bindings,
}

#[derive(Debug, Deserialize)]
pub struct Bindings {
    pub bindings: Vec<HashMap<String, Term>>,
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
