// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end delta and file sync specs.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn published_file_is_ingested_with_its_body() {
    let world = World::new();
    let file = FileFixture::new("minutes", "council");
    world.publish(delta("d1", "2024-01-02T00:00:00Z"), &[ChangeSet { inserts: file.triples(), deletes: vec![] }]);
    world.producer.set_body(&file.vuuid, "%PDF-minutes");

    let report = world.consumer.sync().await;

    assert!(matches!(report.delta, DeltaOutcome::Ingested { files: 1, .. }), "{report}");
    assert_eq!(report.files.succeeded, 1);
    let mut expected = file.triples();
    expected.iter_mut().for_each(|t| t.graph = None);
    expected.sort();
    assert_eq!(world.store.graph(INGEST_GRAPH), expected);
    assert!(world.store.graph(TEMP_GRAPH).is_empty());
    assert_eq!(std::fs::read_to_string(world.body_path(&file.puri)).unwrap(), "%PDF-minutes");
}

#[tokio::test]
async fn retracted_file_is_removed_with_its_body() {
    let world = World::new();
    let file = FileFixture::new("minutes", "council");
    world.publish(delta("d1", "2024-01-02T00:00:00Z"), &[ChangeSet { inserts: file.triples(), deletes: vec![] }]);
    world.producer.set_body(&file.vuuid, "%PDF-minutes");
    world.consumer.sync().await;

    world.publish(delta("d2", "2024-01-03T00:00:00Z"), &[ChangeSet { inserts: vec![], deletes: file.triples() }]);
    let report = world.consumer.sync().await;

    assert!(matches!(report.delta, DeltaOutcome::Ingested { files: 1, .. }), "{report}");
    assert_eq!(report.files.succeeded, 1);
    assert!(world.store.graph(INGEST_GRAPH).is_empty());
    assert!(world.store.graph(REMOVAL_GRAPH).is_empty());
    assert!(!world.body_path(&file.puri).exists());
}

#[tokio::test]
async fn unavailable_body_is_retried_on_the_next_trigger() {
    let world = World::new();
    let file = FileFixture::new("minutes", "council");
    world.publish(delta("d1", "2024-01-02T00:00:00Z"), &[ChangeSet { inserts: file.triples(), deletes: vec![] }]);
    world.producer.set_body(&file.vuuid, "%PDF-minutes");
    world.producer.fail_downloads(&file.vuuid, 1);

    let first = world.consumer.sync().await;
    assert_eq!(first.files.pending, 1, "{first}");
    assert!(world.store.graph(INGEST_GRAPH).is_empty());

    let second = world.consumer.sync().await;
    assert!(matches!(second.delta, DeltaOutcome::UpToDate { .. }), "{second}");
    assert_eq!(second.files.succeeded, 1, "{second}");
    assert!(world.body_path(&file.puri).exists());
}

#[tokio::test]
async fn restart_fails_interrupted_job_and_resumes_from_last_success() {
    let world = World::new();
    world.publish(delta("d1", "2024-01-02T00:00:00Z"), &[ChangeSet::default()]);
    world.consumer.sync().await;

    let interrupted = world.consumer.ledger().create_job(DELTA_OP, "http://data.test/services/consumer").await.unwrap();
    world.publish(delta("d2", "2024-01-03T00:00:00Z"), &[ChangeSet::default()]);

    let blocked = world.consumer.delta_sync().await;
    assert_eq!(blocked, DeltaOutcome::AlreadyRunning { job: interrupted.uri() });

    let failed = world.consumer.startup().await.unwrap();
    assert_eq!(failed.len(), 1);

    let resumed = world.consumer.delta_sync().await;
    assert!(matches!(resumed, DeltaOutcome::Ingested { files: 1, .. }), "{resumed}");
    assert_eq!(world.producer.download_count("d1"), 1);
    assert_eq!(world.producer.download_count("d2"), 1);
}
