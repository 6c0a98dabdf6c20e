// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::dispatch::SingleGraphDispatcher;
use crate::test_helpers::*;
use dsync_adapters::FakeProducerAdapter;
use dsync_core::vocab;
use dsync_core::{ChangeSet, FakeClock, MemoryStore, Term, Triple};

const NAME: &str = "http://data.test/vocab/name";
const PERSON: &str = "http://data.test/people/1";

type Sync = DeltaSync<MemoryStore, FakeProducerAdapter, FakeClock>;

fn pipeline(h: &Harness, config: SyncConfig) -> Sync {
    DeltaSync::new(
        h.ledger.clone(),
        h.producer.clone(),
        Arc::new(SingleGraphDispatcher::new(INGEST_GRAPH)),
        Arc::new(config),
    )
}

fn name(value: &str) -> Triple {
    Triple::new(Term::uri(PERSON), NAME, Term::literal(value))
}

/// Renames the person from `old` to `new`.
fn rename(old: Option<&str>, new: &str) -> Vec<u8> {
    body(&[ChangeSet { inserts: vec![name(new)], deletes: old.map(name).into_iter().collect() }])
}

async fn tasks_of(h: &Harness, job: &str) -> Vec<Task> {
    let job = h.ledger.load_job(job).await.unwrap().unwrap();
    let mut tasks = Vec::new();
    for uri in &job.tasks {
        tasks.push(h.ledger.load_task(uri).await.unwrap().unwrap());
    }
    tasks.sort_by_key(|t| t.index.parse::<usize>().unwrap());
    tasks
}

fn job_uri(outcome: &DeltaOutcome) -> String {
    match outcome {
        DeltaOutcome::Ingested { job, .. } | DeltaOutcome::Failed { job: Some(job), .. } => job.clone(),
        other => panic!("no job in {other:?}"),
    }
}

#[tokio::test]
async fn files_are_applied_in_creation_order() {
    let h = Harness::new();
    h.producer.publish(delta_file("t3", "2024-01-03T00:00:00Z"), rename(Some("v2"), "v3"));
    h.producer.publish(delta_file("t1", "2024-01-01T10:00:00Z"), rename(None, "v1"));
    h.producer.publish(delta_file("t2", "2024-01-02T00:00:00Z"), rename(Some("v1"), "v2"));

    let outcome = pipeline(&h, h.config()).start().await;

    assert!(matches!(outcome, DeltaOutcome::Ingested { files: 3, .. }), "{outcome}");
    assert_eq!(h.store.graph(INGEST_GRAPH), vec![name("v3")]);

    let tasks = tasks_of(&h, &job_uri(&outcome)).await;
    assert!(tasks.iter().all(|t| t.status == Status::Success));
    assert!(tasks[0].parents.is_empty());
    assert_eq!(tasks[1].parents, vec![tasks[0].uri()]);
    assert_eq!(tasks[2].parents, vec![tasks[1].uri()]);
    let job = h.ledger.load_job(&job_uri(&outcome)).await.unwrap().unwrap();
    assert_eq!(job.status, Status::Success);
}

#[tokio::test]
async fn watermark_advances_after_success() {
    let h = Harness::new();
    let sync = pipeline(&h, h.config());
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00Z"), rename(None, "v1"));
    sync.start().await;

    let outcome = sync.start().await;
    assert_eq!(outcome, DeltaOutcome::UpToDate { since: at("2024-01-02T00:00:00Z") });

    h.clock.advance(chrono::Duration::minutes(1));
    h.producer.publish(delta_file("t2", "2024-01-03T00:00:00Z"), rename(Some("v1"), "v2"));
    let outcome = sync.start().await;
    assert!(matches!(outcome, DeltaOutcome::Ingested { files: 1, .. }), "{outcome}");
    assert_eq!(h.producer.download_count("t1"), 1);
    assert_eq!(h.store.graph(INGEST_GRAPH), vec![name("v2")]);
}

#[tokio::test]
async fn watermark_keeps_sub_millisecond_precision() {
    let h = Harness::new();
    let sync = pipeline(&h, h.config());
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00.123456Z"), rename(None, "v1"));
    let outcome = sync.start().await;
    assert!(matches!(outcome, DeltaOutcome::Ingested { files: 1, .. }), "{outcome}");

    h.clock.advance(chrono::Duration::minutes(1));
    let outcome = sync.start().await;
    assert_eq!(outcome, DeltaOutcome::UpToDate { since: at("2024-01-02T00:00:00.123456Z") });
    assert_eq!(h.producer.download_count("t1"), 1);
}

#[tokio::test]
async fn busy_job_blocks_a_second_run() {
    let h = Harness::new();
    let running = h.ledger.create_job(DELTA_OP, CREATOR).await.unwrap();
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00Z"), rename(None, "v1"));

    let outcome = pipeline(&h, h.config()).start().await;

    assert_eq!(outcome, DeltaOutcome::AlreadyRunning { job: running.uri() });
    assert_eq!(h.producer.download_count("t1"), 0);
    assert!(h.store.graph(INGEST_GRAPH).is_empty());
}

#[tokio::test]
async fn failing_file_fails_the_job_and_keeps_earlier_tasks() {
    let h = Harness::new();
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00Z"), rename(None, "v1"));
    h.producer.publish(delta_file("t2", "2024-01-03T00:00:00Z"), b"{not json".to_vec());
    h.producer.publish(delta_file("t3", "2024-01-04T00:00:00Z"), rename(Some("v1"), "v3"));

    let outcome = pipeline(&h, h.config()).start().await;

    let job = job_uri(&outcome);
    assert!(matches!(outcome, DeltaOutcome::Failed { job: Some(_), .. }));
    let tasks = tasks_of(&h, &job).await;
    assert_eq!(tasks.iter().map(|t| t.status).collect::<Vec<_>>(), vec![Status::Success, Status::Failed]);
    assert_eq!(h.producer.download_count("t3"), 0);
    assert_eq!(h.store.graph(INGEST_GRAPH), vec![name("v1")]);
    assert_eq!(h.ledger.load_job(&job).await.unwrap().unwrap().status, Status::Failed);
    assert_eq!(h.ledger.error_messages(&job).await.unwrap().len(), 1);
    let task_errors = h.ledger.error_messages(&tasks[1].uri()).await.unwrap();
    assert!(task_errors[0].contains("t2"), "{task_errors:?}");

    // The next run resumes at the failed file.
    let since = watermark(&h.ledger, &h.config()).await.unwrap();
    assert_eq!(since, at("2024-01-02T00:00:00Z"));
}

#[tokio::test]
async fn failing_error_write_still_fails_job_and_task() {
    let h = Harness::new();
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00Z"), b"{not json".to_vec());
    h.store.reject_predicate(vocab::OSLC_MESSAGE);

    let outcome = pipeline(&h, h.config()).start().await;

    let job = job_uri(&outcome);
    assert_eq!(h.ledger.load_job(&job).await.unwrap().unwrap().status, Status::Failed);
    let tasks = tasks_of(&h, &job).await;
    assert_eq!(tasks.iter().map(|t| t.status).collect::<Vec<_>>(), vec![Status::Failed]);
    assert!(h.ledger.error_messages(&job).await.unwrap().is_empty());

    h.store.clear_rejections();
    h.clock.advance(chrono::Duration::minutes(1));
    let outcome = pipeline(&h, h.config()).start().await;
    assert!(matches!(outcome, DeltaOutcome::Failed { job: Some(ref next), .. } if *next != job), "{outcome}");
}

#[tokio::test]
async fn download_failure_fails_the_job() {
    let h = Harness::new();
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00Z"), rename(None, "v1"));
    h.producer.fail_downloads("t1", 1);

    let outcome = pipeline(&h, h.config()).start().await;
    assert!(matches!(outcome, DeltaOutcome::Failed { job: Some(_), .. }));

    h.clock.advance(chrono::Duration::minutes(1));
    let outcome = pipeline(&h, h.config()).start().await;
    assert!(matches!(outcome, DeltaOutcome::Ingested { files: 1, .. }), "{outcome}");
}

#[tokio::test]
async fn missing_watermark_records_standalone_error() {
    let h = Harness::new();
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00Z"), rename(None, "v1"));
    let config = SyncConfig { start_from: None, ..h.config() };

    let outcome = pipeline(&h, config).start().await;

    assert!(matches!(outcome, DeltaOutcome::Failed { job: None, .. }));
    let messages: Vec<String> = h
        .store
        .graph(JOBS_GRAPH)
        .into_iter()
        .filter(|t| t.predicate_uri() == vocab::OSLC_MESSAGE)
        .map(|t| t.object.value().to_string())
        .collect();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("[delta-consumer] Unexpected error while ingesting"));
    assert_eq!(h.producer.download_count("t1"), 0);
}

#[tokio::test]
async fn listing_failure_is_recorded_without_a_job() {
    let h = Harness::new();
    h.producer.fail_listing(true);
    let outcome = pipeline(&h, h.config()).start().await;
    assert!(matches!(outcome, DeltaOutcome::Failed { job: None, .. }));
    assert!(h.ledger.get_jobs(DELTA_OP, &[], &[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn disabled_ingest_does_nothing() {
    let h = Harness::new();
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00Z"), rename(None, "v1"));
    let config = SyncConfig { disable_delta_ingest: true, ..h.config() };
    assert_eq!(pipeline(&h, config).start().await, DeltaOutcome::Disabled);
    assert!(h.producer.calls().is_empty());
}

#[tokio::test]
async fn waits_for_successful_initial_sync() {
    let h = Harness::new();
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00Z"), rename(None, "v1"));
    let sync = pipeline(&h, SyncConfig { wait_for_initial_sync: true, ..h.config() });

    assert_eq!(sync.start().await, DeltaOutcome::AwaitingInitialSync);

    let initial = h.ledger.create_job(INITIAL_OP, CREATOR).await.unwrap();
    assert_eq!(sync.start().await, DeltaOutcome::AwaitingInitialSync);

    h.ledger.update_status(&initial.uri(), Status::Success).await.unwrap();
    assert!(matches!(sync.start().await, DeltaOutcome::Ingested { files: 1, .. }));
}

#[tokio::test]
async fn consumed_delta_files_are_removed_unless_kept() {
    let h = Harness::new();
    let file = delta_file("t1", "2024-01-02T00:00:00Z");
    h.producer.publish(file.clone(), rename(None, "v1"));
    pipeline(&h, h.config()).start().await;
    assert!(!file.local_path(&h.deltas()).exists());

    let kept = Harness::new();
    kept.producer.publish(file.clone(), rename(None, "v1"));
    pipeline(&kept, SyncConfig { keep_delta_files: true, ..kept.config() }).start().await;
    assert!(file.local_path(&kept.deltas()).exists());
}

#[tokio::test]
async fn file_metadata_is_staged_not_ingested() {
    let h = Harness::new();
    let file = dsync_core::test_support::FileFixture::new("report", "docs");
    let change_set = ChangeSet { inserts: file.triples(), deletes: vec![] };
    h.producer.publish(delta_file("t1", "2024-01-02T00:00:00Z"), body(&[change_set]));

    pipeline(&h, h.config()).start().await;

    assert!(h.store.graph(INGEST_GRAPH).is_empty());
    assert_eq!(h.store.graph(TEMP_GRAPH).len(), file.triples().len());
}
