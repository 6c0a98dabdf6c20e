// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine tests.

use chrono::{DateTime, Utc};
use dsync_adapters::FakeProducerAdapter;
use dsync_core::{ChangeSet, DeltaFile, FakeClock, MemoryStore, SequentialIdGen};
use dsync_storage::{Ledger, LedgerConfig, Updater, UpdaterConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use crate::config::{Remapping, SyncConfig};

pub const JOBS_GRAPH: &str = "http://mu.semte.ch/graphs/system/jobs";
pub const INGEST_GRAPH: &str = "http://data.test/graphs/ingest";
pub const TEMP_GRAPH: &str = "http://data.test/graphs/temp";
pub const REMOVAL_GRAPH: &str = "http://data.test/graphs/temp-removal";
pub const CREATOR: &str = "http://data.test/services/consumer";
pub const DELTA_OP: &str = "http://data.test/operations/delta-sync";
pub const INITIAL_OP: &str = "http://data.test/operations/initial-sync";
pub const FILE_SCOPE: &str = "http://data.test/scopes/file-sync";

pub fn at(timestamp: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(timestamp).unwrap().with_timezone(&Utc)
}

pub fn delta_file(id: &str, created: &str) -> DeltaFile {
    DeltaFile { id: id.to_string(), created: at(created), name: format!("{id}.json") }
}

pub fn body(change_sets: &[ChangeSet]) -> Vec<u8> {
    serde_json::to_vec(change_sets).unwrap()
}

/// Sync configuration rooted in `dir`: deltas under `dir/deltas`, file
/// bodies under `dir/share`.
pub fn sync_config(dir: &std::path::Path) -> SyncConfig {
    SyncConfig {
        service_name: "delta-consumer".to_string(),
        job_creator: CREATOR.to_string(),
        delta_sync_operation: DELTA_OP.to_string(),
        initial_sync_operation: INITIAL_OP.to_string(),
        start_from: Some(at("2024-01-01T00:00:00Z")),
        delta_file_folder: dir.join("deltas"),
        keep_delta_files: false,
        disable_delta_ingest: false,
        disable_file_ingest: false,
        wait_for_initial_sync: false,
        ingest_graph: INGEST_GRAPH.to_string(),
        temp_file_graph: TEMP_GRAPH.to_string(),
        temp_file_removal_graph: REMOVAL_GRAPH.to_string(),
        file_prefixes: vec!["http://data.test/files/".to_string(), "share://".to_string()],
        file_folder: dir.join("share"),
        remapping: Remapping::default(),
        max_download_attempts: 3,
        file_sync_concurrency: 4,
        file_scope: Some(FILE_SCOPE.to_string()),
    }
}

/// In-memory store, fake producer and fake clock behind a ledger.
pub struct Harness {
    pub dir: TempDir,
    pub store: MemoryStore,
    pub clock: FakeClock,
    pub producer: FakeProducerAdapter,
    pub ledger: Ledger<MemoryStore, FakeClock>,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let clock = FakeClock::new();
        let updater = Updater::new(
            store.clone(),
            UpdaterConfig {
                batch_size: 100,
                sleep_between_batches: Duration::ZERO,
                max_attempts: 1,
                retry_backoff: Duration::ZERO,
            },
        );
        let ledger = Ledger::new(
            updater,
            clock.clone(),
            Arc::new(SequentialIdGen::new("id")),
            LedgerConfig {
                jobs_graph: JOBS_GRAPH.to_string(),
                service_name: "delta-consumer".to_string(),
                scope: None,
            },
        );
        Self {
            dir: tempfile::tempdir().unwrap(),
            store,
            clock,
            producer: FakeProducerAdapter::new(),
            ledger,
        }
    }

    pub fn config(&self) -> SyncConfig {
        sync_config(self.dir.path())
    }

    pub fn share(&self) -> PathBuf {
        self.dir.path().join("share")
    }

    pub fn deltas(&self) -> PathBuf {
        self.dir.path().join("deltas")
    }
}
