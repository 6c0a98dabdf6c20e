// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for specs.

pub use chrono::{DateTime, Utc};
pub use dsync_adapters::FakeProducerAdapter;
pub use dsync_core::test_support::FileFixture;
pub use dsync_core::{ChangeSet, DeltaFile, FakeClock, MemoryStore, SequentialIdGen};
pub use dsync_engine::{Consumer, DeltaOutcome, Remapping, SingleGraphDispatcher, SyncConfig};
pub use dsync_storage::{Ledger, LedgerConfig, Updater, UpdaterConfig};
pub use std::path::PathBuf;
pub use std::sync::Arc;
pub use std::time::Duration;
pub use tempfile::TempDir;

pub const JOBS_GRAPH: &str = "http://mu.semte.ch/graphs/system/jobs";
pub const INGEST_GRAPH: &str = "http://data.test/graphs/public";
pub const TEMP_GRAPH: &str = "http://data.test/graphs/temp-files";
pub const REMOVAL_GRAPH: &str = "http://data.test/graphs/temp-files-removal";
pub const DELTA_OP: &str = "http://data.test/operations/delta-sync";
pub const INITIAL_OP: &str = "http://data.test/operations/initial-sync";

pub fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp).unwrap().with_timezone(&Utc)
}

pub fn delta(id: &str, created: &str) -> DeltaFile {
    DeltaFile { id: id.to_string(), created: at(created), name: format!("{id}.json") }
}

pub fn body(change_sets: &[ChangeSet]) -> Vec<u8> {
    serde_json::to_vec(change_sets).unwrap()
}

/// A consumer wired to a memory store and fake producer, with a scratch
/// directory for delta files and file bodies.
pub struct World {
    pub dir: TempDir,
    pub store: MemoryStore,
    pub clock: FakeClock,
    pub producer: FakeProducerAdapter,
    pub consumer: Consumer<MemoryStore, FakeProducerAdapter, FakeClock>,
}

impl World {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let clock = FakeClock::new();
        let producer = FakeProducerAdapter::new();
        let updater = Updater::new(
            store.clone(),
            UpdaterConfig {
                batch_size: 2,
                sleep_between_batches: Duration::ZERO,
                max_attempts: 2,
                retry_backoff: Duration::ZERO,
            },
        );
        let ledger = Ledger::new(
            updater,
            clock.clone(),
            Arc::new(SequentialIdGen::new("spec")),
            LedgerConfig {
                jobs_graph: JOBS_GRAPH.to_string(),
                service_name: "delta-consumer".to_string(),
                scope: None,
            },
        );
        let config = SyncConfig {
            service_name: "delta-consumer".to_string(),
            job_creator: "http://data.test/services/consumer".to_string(),
            delta_sync_operation: DELTA_OP.to_string(),
            initial_sync_operation: INITIAL_OP.to_string(),
            start_from: Some(at("2024-01-01T00:00:00Z")),
            delta_file_folder: dir.path().join("deltas"),
            keep_delta_files: false,
            disable_delta_ingest: false,
            disable_file_ingest: false,
            wait_for_initial_sync: false,
            ingest_graph: INGEST_GRAPH.to_string(),
            temp_file_graph: TEMP_GRAPH.to_string(),
            temp_file_removal_graph: REMOVAL_GRAPH.to_string(),
            file_prefixes: vec!["http://data.test/files/".to_string(), "share://".to_string()],
            file_folder: dir.path().join("share"),
            remapping: Remapping::default(),
            max_download_attempts: 2,
            file_sync_concurrency: 2,
            file_scope: None,
        };
        let consumer = Consumer::new(
            ledger,
            producer.clone(),
            Arc::new(SingleGraphDispatcher::new(INGEST_GRAPH)),
            Arc::new(config),
        );
        Self { dir, store, clock, producer, consumer }
    }

    /// Local path of a `share://` URI.
    pub fn body_path(&self, puri: &str) -> PathBuf {
        self.dir.path().join("share").join(puri.trim_start_matches("share://"))
    }

    /// Publish a delta file and move the clock past it.
    pub fn publish(&self, file: DeltaFile, change_sets: &[ChangeSet]) {
        self.producer.publish(file, body(change_sets));
        self.clock.advance(chrono::Duration::minutes(1));
    }
}
