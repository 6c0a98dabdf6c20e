// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ledger::test_helpers::*;
use chrono::Duration;

const VURI: &str = "http://data.test/files/v1";

#[tokio::test]
async fn created_task_loads_back_identically() {
    let (ledger, _, _) = ledger();
    let task = ledger.create_file_task(VURI, FileTaskKind::add()).await.unwrap();
    let loaded = ledger.load_file_task(&task.uri()).await.unwrap().unwrap();
    assert_eq!(loaded, task);
}

#[tokio::test]
async fn save_writes_only_changed_statements() {
    let (ledger, store, clock) = ledger();
    let before = ledger.create_file_task(VURI, FileTaskKind::add()).await.unwrap();
    let mut after = before.clone();
    after.kind = FileTaskKind::Add {
        download_attempts: 1,
        download: SubStatus::Ongoing,
        remap: SubStatus::NotStarted,
        moving: SubStatus::NotStarted,
    };
    after.status = Status::Busy;
    clock.advance(Duration::seconds(1));
    let writes = store.calls().len();

    ledger.save_file_task(&before, &mut after).await.unwrap();
    let calls = &store.calls()[writes..];
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].triples.len(), 4);
    assert_eq!(calls[1].triples.len(), 4);

    let loaded = ledger.load_file_task(&after.uri()).await.unwrap().unwrap();
    assert_eq!(loaded, after);
    assert_eq!(loaded.modified, before.modified + Duration::seconds(1));
}

#[tokio::test]
async fn unchanged_save_is_a_no_op() {
    let (ledger, store, _) = ledger();
    let before = ledger.create_file_task(VURI, FileTaskKind::remove()).await.unwrap();
    let writes = store.calls().len();
    let mut same = before.clone();
    ledger.save_file_task(&before, &mut same).await.unwrap();
    assert_eq!(store.calls().len(), writes);
}

#[tokio::test]
async fn open_tasks_exclude_terminal_and_other_kinds() {
    let (ledger, _, clock) = ledger();
    let open = ledger.create_file_task(VURI, FileTaskKind::add()).await.unwrap();
    clock.advance(Duration::seconds(1));
    let done = ledger.create_file_task("http://data.test/files/v2", FileTaskKind::add()).await.unwrap();
    let mut finished = done.clone();
    finished.status = Status::Success;
    ledger.save_file_task(&done, &mut finished).await.unwrap();
    ledger.create_file_task(VURI, FileTaskKind::update()).await.unwrap();

    let tasks = ledger.open_file_tasks(types::FILE_ADD_TASK).await.unwrap();
    assert_eq!(tasks, vec![open]);
    assert_eq!(ledger.file_tasks(types::FILE_ADD_TASK).await.unwrap().len(), 2);
}

#[tokio::test]
async fn markers_are_graph_scoped() {
    let (ledger, _, _) = ledger();
    ledger.mark_task_failure("http://data.test/graphs/temp", VURI).await.unwrap();
    let failed = ledger.failed_subjects("http://data.test/graphs/temp").await.unwrap();
    assert!(failed.contains(VURI));
    assert!(ledger.failed_subjects("http://data.test/graphs/other").await.unwrap().is_empty());
}
