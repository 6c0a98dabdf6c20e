// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RDF terms and triples.
//!
//! Terms travel as `{ value, type, datatype?, "xml:lang"? }` objects both in
//! delta files and in SPARQL JSON results. Internally they are normalized so
//! that a `literal` with a datatype and a `typed-literal` compare equal.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::vocab::{XSD_DATETIME, XSD_INTEGER};

/// A single RDF term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "WireTerm", into = "WireTerm")]
pub enum Term {
    Uri(String),
    Bnode(String),
    Literal { value: String, datatype: Option<String>, lang: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum WireKind {
    Uri,
    Bnode,
    Literal,
    TypedLiteral,
}

#[derive(Serialize, Deserialize)]
struct WireTerm {
    value: String,
    #[serde(rename = "type")]
    kind: WireKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    lang: Option<String>,
}

impl From<WireTerm> for Term {
    fn from(wire: WireTerm) -> Self {
        match wire.kind {
            WireKind::Uri => Term::Uri(wire.value),
            WireKind::Bnode => Term::Bnode(wire.value),
            WireKind::Literal | WireKind::TypedLiteral => {
                Term::Literal { value: wire.value, datatype: wire.datatype, lang: wire.lang }
            }
        }
    }
}

impl From<Term> for WireTerm {
    fn from(term: Term) -> Self {
        match term {
            Term::Uri(value) => WireTerm { value, kind: WireKind::Uri, datatype: None, lang: None },
            Term::Bnode(value) => {
                WireTerm { value, kind: WireKind::Bnode, datatype: None, lang: None }
            }
            Term::Literal { value, datatype: Some(dt), lang: None } => {
                WireTerm { value, kind: WireKind::TypedLiteral, datatype: Some(dt), lang: None }
            }
            Term::Literal { value, lang, .. } => {
                WireTerm { value, kind: WireKind::Literal, datatype: None, lang }
            }
        }
    }
}

impl Term {
    pub fn uri(value: impl Into<String>) -> Self {
        Term::Uri(value.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal { value: value.into(), datatype: None, lang: None }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal { value: value.into(), datatype: Some(datatype.into()), lang: None }
    }

    pub fn lang_literal(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Term::Literal { value: value.into(), datatype: None, lang: Some(lang.into()) }
    }

    /// `xsd:dateTime` at full precision, so it parses back to the same instant.
    pub fn date_time(at: DateTime<Utc>) -> Self {
        Term::typed(at.to_rfc3339_opts(SecondsFormat::AutoSi, true), XSD_DATETIME)
    }

    pub fn integer(n: i64) -> Self {
        Term::typed(n.to_string(), XSD_INTEGER)
    }

    /// Lexical value without type information.
    pub fn value(&self) -> &str {
        match self {
            Term::Uri(v) | Term::Bnode(v) | Term::Literal { value: v, .. } => v,
        }
    }

    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Term::Uri(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, Term::Uri(_))
    }

    /// Parse the value as an RFC 3339 timestamp.
    pub fn as_date_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.value()).ok().map(|d| d.with_timezone(&Utc))
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.value().trim().parse().ok()
    }

    /// Render the term in SPARQL update syntax, preserving datatype and
    /// language tags.
    pub fn to_sparql(&self) -> String {
        match self {
            Term::Uri(v) => format!("<{}>", escape_iri(v)),
            Term::Bnode(v) => format!("_:{v}"),
            Term::Literal { value, datatype, lang } => {
                let mut out = escape_string(value);
                if let Some(lang) = lang {
                    let _ = write!(out, "@{lang}");
                } else if let Some(dt) = datatype {
                    let _ = write!(out, "^^<{}>", escape_iri(dt));
                }
                out
            }
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sparql())
    }
}

/// Quote a literal, escaping the characters SPARQL's string grammar forbids.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escape characters that may not appear inside `<...>` as `\uXXXX`
/// codepoint escapes, which the store decodes back to the same IRI.
fn escape_iri(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c <= ' ' || "<>\"{}|^`\\".contains(c) {
            let _ = write!(out, "\\u{:04X}", c as u32);
        } else {
            out.push(c);
        }
    }
    out
}

/// A triple, optionally tagged with the graph it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Term>,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self { subject, predicate: Term::Uri(predicate.into()), object, graph: None }
    }

    pub fn in_graph(mut self, graph: impl Into<String>) -> Self {
        self.graph = Some(Term::Uri(graph.into()));
        self
    }

    pub fn graph_uri(&self) -> Option<&str> {
        self.graph.as_ref().map(Term::value)
    }

    pub fn predicate_uri(&self) -> &str {
        self.predicate.value()
    }

    /// `s p o .` without the graph.
    pub fn to_sparql(&self) -> String {
        format!(
            "{} {} {} .",
            self.subject.to_sparql(),
            self.predicate.to_sparql(),
            self.object.to_sparql()
        )
    }

    /// Same statement with the subject or object URI `from` rewritten to `to`.
    pub fn rewrite_uri(&self, from: &str, to: &str) -> Triple {
        let swap = |t: &Term| match t {
            Term::Uri(v) if v == from => Term::Uri(to.to_string()),
            other => other.clone(),
        };
        Triple {
            subject: swap(&self.subject),
            predicate: self.predicate.clone(),
            object: swap(&self.object),
            graph: self.graph.clone(),
        }
    }
}

/// Triple pattern with optional bound positions, scoped to a graph or to
/// every graph when `graph` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    pub graph: Option<String>,
    pub subject: Option<Term>,
    pub predicate: Option<String>,
    pub object: Option<Term>,
}

impl Pattern {
    pub fn in_graph(graph: impl Into<String>) -> Self {
        Self { graph: Some(graph.into()), ..Self::default() }
    }

    pub fn any_graph() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: Term) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    /// Whether a stored triple in `graph` satisfies this pattern.
    pub fn matches(&self, graph: &str, triple: &Triple) -> bool {
        self.graph.as_deref().map_or(true, |g| g == graph)
            && self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self.predicate.as_deref().map_or(true, |p| p == triple.predicate_uri())
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }
}

#[cfg(test)]
#[path = "term_tests.rs"]
mod tests;
