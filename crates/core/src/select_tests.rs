// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::vocab::XSD_DATETIME;

const STATUS: &str = "http://ex.org/status";
const AT: &str = "http://ex.org/at";
const PART_OF: &str = "http://ex.org/partOf";

fn at(ts: &str) -> Term {
    Term::typed(ts, XSD_DATETIME)
}

fn fixture() -> Vec<Triple> {
    let t = |s: &str, p: &str, o: Term| Triple::new(Term::uri(s), p, o);
    vec![
        t("http://ex.org/a", STATUS, Term::uri("http://ex.org/ok")),
        t("http://ex.org/a", AT, at("2024-01-02T00:00:00Z")),
        t("http://ex.org/a", PART_OF, Term::uri("http://ex.org/job")),
        t("http://ex.org/b", STATUS, Term::uri("http://ex.org/ok")),
        t("http://ex.org/b", AT, at("2024-01-10T00:00:00.000001Z")),
        t("http://ex.org/c", STATUS, Term::uri("http://ex.org/failed")),
        t("http://ex.org/c", AT, at("2024-02-01T00:00:00Z")),
    ]
}

fn run(select: &Select) -> Vec<Row> {
    let triples = fixture();
    let refs: Vec<&Triple> = triples.iter().collect();
    select.evaluate(&refs)
}

fn values(rows: &[Row], var: &str) -> Vec<String> {
    rows.iter().map(|r| r[var].value().to_string()).collect()
}

#[test]
fn clauses_join_on_shared_variables() {
    let select = Select::in_graph("g")
        .vars(&["s"])
        .clause(Node::var("s"), STATUS, Node::uri("http://ex.org/ok"))
        .clause(Node::var("s"), PART_OF, Node::var("job"));
    assert_eq!(values(&run(&select), "s"), vec!["http://ex.org/a"]);
}

#[test]
fn latest_by_timestamp_with_filters() {
    let select = Select::in_graph("g")
        .vars(&["s", "at"])
        .clause(Node::var("s"), STATUS, Node::var("status"))
        .clause(Node::var("s"), AT, Node::var("at"))
        .none_of("status", [Term::uri("http://ex.org/failed")])
        .order_by("at", Order::Desc)
        .limit(1);
    let rows = run(&select);
    assert_eq!(values(&rows, "s"), vec!["http://ex.org/b"]);
    assert_eq!(rows[0].len(), 2);
}

#[test]
fn empty_membership_list_keeps_nothing() {
    let select = Select::in_graph("g")
        .clause(Node::var("s"), STATUS, Node::var("status"))
        .one_of("status", []);
    assert!(run(&select).is_empty());
}

#[test]
fn projection_removes_duplicates() {
    let select = Select::in_graph("g")
        .vars(&["status"])
        .clause(Node::var("s"), STATUS, Node::var("status"))
        .order_by("status", Order::Asc);
    assert_eq!(values(&run(&select), "status"), vec!["http://ex.org/failed", "http://ex.org/ok"]);
}

#[test]
fn timestamps_compare_chronologically_across_precisions() {
    let millis = at("2024-01-01T00:00:00.100Z");
    let micros = at("2024-01-01T00:00:00.0999999Z");
    assert_eq!(compare_terms(&micros, &millis), Ordering::Less);
}
