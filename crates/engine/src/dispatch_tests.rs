// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dsync_core::Term;

const INGEST: &str = "http://data.test/graphs/ingest";

fn change_set() -> ChangeSet {
    let t = |o: &str| Triple::new(Term::uri("http://s"), "http://p", Term::literal(o));
    ChangeSet {
        inserts: vec![t("new").in_graph("http://producer/graph"), t("plain")],
        deletes: vec![t("old").in_graph("http://producer/graph")],
    }
}

#[test]
fn single_graph_retargets_inserts_and_deletes() {
    let out = SingleGraphDispatcher::new(INGEST).dispatch(change_set());
    assert!(out.inserts.iter().chain(&out.deletes).all(|t| t.graph_uri() == Some(INGEST)));
    assert_eq!(out.inserts.len(), 2);
    assert_eq!(out.deletes.len(), 1);
}

#[test]
fn passthrough_keeps_producer_graphs() {
    let out = PassthroughDispatcher.dispatch(change_set());
    assert_eq!(out, change_set());
}

#[test]
fn resolve_defaults_to_single_graph() {
    let registry = DispatcherRegistry::new();
    assert_eq!(registry.resolve(None, INGEST).name(), SingleGraphDispatcher::NAME);
    assert_eq!(registry.resolve(Some("no-such"), INGEST).name(), SingleGraphDispatcher::NAME);
    assert_eq!(registry.resolve(Some("passthrough"), INGEST).name(), PassthroughDispatcher::NAME);
}

struct DropDeletes;

impl Dispatcher for DropDeletes {
    fn name(&self) -> &str {
        "drop-deletes"
    }

    fn dispatch(&self, change_set: ChangeSet) -> ChangeSet {
        ChangeSet { deletes: Vec::new(), ..change_set }
    }
}

#[test]
fn custom_strategies_can_be_registered() {
    let mut registry = DispatcherRegistry::new();
    registry.register("drop-deletes", |_| Arc::new(DropDeletes));
    let dispatcher = registry.resolve(Some("drop-deletes"), INGEST);
    assert_eq!(dispatcher.name(), "drop-deletes");
    assert!(dispatcher.dispatch(change_set()).deletes.is_empty());
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["drop-deletes", "passthrough", "single-graph"]);
}
