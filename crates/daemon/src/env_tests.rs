// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::collections::HashMap;
use yare::parameterized;

const REQUIRED: &[(&str, &str)] = &[
    ("SERVICE_NAME", "delta-consumer"),
    ("JOB_CREATOR_URI", "http://data.test/services/consumer"),
    ("DELTA_SYNC_JOB_OPERATION", "http://data.test/operations/delta-sync"),
    ("INITIAL_SYNC_JOB_OPERATION", "http://data.test/operations/initial-sync"),
    ("SYNC_BASE_URL", "http://producer"),
];

fn settings(extra: &[(&str, &str)]) -> Result<Settings, ConfigError> {
    let vars: HashMap<String, String> =
        REQUIRED.iter().chain(extra).map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Settings::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults() {
    let s = settings(&[]).unwrap();
    assert_eq!(s.sync.delta_file_folder, PathBuf::from("/tmp/"));
    assert!(s.sync.wait_for_initial_sync);
    assert!(!s.sync.keep_delta_files);
    assert_eq!(s.sync.start_from, None);
    assert_eq!(s.sync.file_prefixes, vec!["share://".to_string()]);
    assert_eq!(s.sync.max_download_attempts, 3);
    assert!(s.sync.remapping.is_empty());
    assert_eq!(s.updater.batch_size, 100);
    assert_eq!(s.updater.max_attempts, 5);
    assert_eq!(s.updater.retry_backoff, Duration::from_secs(60));
    assert_eq!(s.ledger.jobs_graph, "http://mu.semte.ch/graphs/system/jobs");
    assert_eq!(s.ledger.service_name, "delta-consumer");
    assert_eq!(s.producer.files_path, "/sync/files");
    assert_eq!(s.producer.download_path, "/files/:id/download");
    assert_eq!(s.sync_interval, Duration::from_secs(60));
    assert_eq!(s.dispatch_strategy, None);
}

#[parameterized(
    service_name = { "SERVICE_NAME" },
    job_creator = { "JOB_CREATOR_URI" },
    delta_operation = { "DELTA_SYNC_JOB_OPERATION" },
    initial_operation = { "INITIAL_SYNC_JOB_OPERATION" },
    base_url = { "SYNC_BASE_URL" },
)]
fn missing_required_value(key: &str) {
    let err = settings(&[(key, " ")]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing(k) if k == key), "{err}");
}

#[parameterized(
    bad_flag = { "KEEP_DELTA_FILES", "maybe" },
    bad_number = { "BATCH_SIZE", "lots" },
    negative_millis = { "SYNC_INTERVAL_MS", "-5" },
    bad_timestamp = { "START_FROM_DELTA_TIMESTAMP", "yesterday" },
)]
fn invalid_value(key: &str, value: &str) {
    let err = settings(&[(key, value)]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: k, .. } if k == key), "{err}");
}

#[test]
fn overrides() {
    let s = settings(&[
        ("START_FROM_DELTA_TIMESTAMP", "2024-03-01T12:00:00+01:00"),
        ("WAIT_FOR_INITIAL_SYNC", "false"),
        ("DISABLE_FILE_INGEST", "TRUE"),
        ("FILE_PREFIXES", "http://data.test/files/, share://"),
        ("MU_CALL_SCOPE_ID_FILE_SYNC", "http://data.test/scopes/file-sync"),
        ("MU_CALL_SCOPE_ID_DELTA_SYNC", "http://data.test/scopes/delta-sync"),
        ("SLEEP_BETWEEN_BATCHES", "0"),
        ("DISPATCH_STRATEGY", "passthrough"),
    ])
    .unwrap();
    assert_eq!(s.sync.start_from.unwrap().to_rfc3339(), "2024-03-01T11:00:00+00:00");
    assert!(!s.sync.wait_for_initial_sync);
    assert!(s.sync.disable_file_ingest);
    assert_eq!(s.sync.file_prefixes, vec!["http://data.test/files/", "share://"]);
    assert_eq!(s.sync.file_scope.as_deref(), Some("http://data.test/scopes/file-sync"));
    assert_eq!(s.ledger.scope.as_deref(), Some("http://data.test/scopes/delta-sync"));
    assert_eq!(s.updater.sleep_between_batches, Duration::ZERO);
    assert_eq!(s.dispatch_strategy.as_deref(), Some("passthrough"));
}

#[test]
fn remapping_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("remap.toml");
    std::fs::write(&path, "[remap]\n\"/legacy\" = \"archive\"\n").unwrap();

    let s = settings(&[("REMAPPING_CONFIG", path.to_str().unwrap())]).unwrap();

    assert_eq!(s.sync.remapping.apply("share://legacy/a.pdf").as_deref(), Some("share://archive/a.pdf"));
}

#[test]
fn unreadable_remapping_file_is_an_error() {
    let err = settings(&[("REMAPPING_CONFIG", "/nonexistent/remap.toml")]).unwrap_err();
    assert!(matches!(err, ConfigError::Remap(RemapError::Io { .. })));
}

#[test]
#[serial]
fn from_env_reads_process_environment() {
    for (key, value) in REQUIRED {
        std::env::set_var(key, value);
    }
    std::env::set_var("BATCH_SIZE", "25");

    let s = Settings::from_env().unwrap();

    assert_eq!(s.updater.batch_size, 25);
    assert_eq!(s.producer.base_url, "http://producer");
    for (key, _) in REQUIRED {
        std::env::remove_var(key);
    }
    std::env::remove_var("BATCH_SIZE");
}

#[test]
#[serial]
fn log_settings() {
    std::env::set_var("DSYNC_LOG_FORMAT", "JSON");
    std::env::set_var("DSYNC_LOG_DIR", "/var/log/dsync");
    assert!(log_json());
    assert_eq!(log_dir(), Some(PathBuf::from("/var/log/dsync")));

    std::env::remove_var("DSYNC_LOG_FORMAT");
    std::env::set_var("DSYNC_LOG_DIR", "");
    assert!(!log_json());
    assert_eq!(log_dir(), None);
    std::env::remove_var("DSYNC_LOG_DIR");
}
