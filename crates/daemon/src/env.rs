// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.

use chrono::{DateTime, Utc};
use dsync_adapters::ProducerConfig;
use dsync_engine::{RemapError, Remapping, SyncConfig};
use dsync_storage::{LedgerConfig, UpdaterConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("expected '{0}' to be provided")]
    Missing(&'static str),
    #[error("invalid value {value:?} for '{key}': {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
    #[error(transparent)]
    Remap(#[from] RemapError),
}

/// Everything the daemon needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sync: SyncConfig,
    pub updater: UpdaterConfig,
    pub ledger: LedgerConfig,
    pub producer: ProducerConfig,
    pub sparql_endpoint: String,
    pub store_timeout: Duration,
    /// Registered name of the dispatch strategy; the default when unset
    pub dispatch_strategy: Option<String>,
    pub sync_interval: Duration,
}

impl Settings {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup: &|key: &str| lookup(key).filter(|v| !v.trim().is_empty()) };

        let service_name = env.required("SERVICE_NAME")?;
        let remapping = match env.get("REMAPPING_CONFIG") {
            Some(path) => Remapping::load(Path::new(&path))?,
            None => Remapping::default(),
        };
        let ingest_graph = env.or("INGEST_GRAPH", "http://mu.semte.ch/graphs/public");

        let sync = SyncConfig {
            service_name: service_name.clone(),
            job_creator: env.required("JOB_CREATOR_URI")?,
            delta_sync_operation: env.required("DELTA_SYNC_JOB_OPERATION")?,
            initial_sync_operation: env.required("INITIAL_SYNC_JOB_OPERATION")?,
            start_from: env.timestamp("START_FROM_DELTA_TIMESTAMP")?,
            delta_file_folder: PathBuf::from(env.or("DELTA_FILE_FOLDER", "/tmp/")),
            keep_delta_files: env.flag("KEEP_DELTA_FILES", false)?,
            disable_delta_ingest: env.flag("DISABLE_DELTA_INGEST", false)?,
            disable_file_ingest: env.flag("DISABLE_FILE_INGEST", false)?,
            wait_for_initial_sync: env.flag("WAIT_FOR_INITIAL_SYNC", true)?,
            ingest_graph,
            temp_file_graph: env.or("TEMP_FILE_GRAPH", "http://mu.semte.ch/graphs/temp-files"),
            temp_file_removal_graph: env
                .or("TEMP_FILE_REMOVAL_GRAPH", "http://mu.semte.ch/graphs/temp-files-removal"),
            file_prefixes: env.list("FILE_PREFIXES", &["share://"]),
            file_folder: PathBuf::from(env.or("FILE_FOLDER", "/share")),
            remapping,
            max_download_attempts: env.number("MAX_DOWNLOAD_ATTEMPTS", 3)?,
            file_sync_concurrency: env.number("FILE_SYNC_CONCURRENCY", 4)?,
            file_scope: env.get("MU_CALL_SCOPE_ID_FILE_SYNC"),
        };

        let updater = UpdaterConfig {
            batch_size: env.number("BATCH_SIZE", 100)?,
            sleep_between_batches: env.millis("SLEEP_BETWEEN_BATCHES", 1000)?,
            max_attempts: env.number("MAX_DB_RETRY_ATTEMPTS", 5)?,
            retry_backoff: env.millis("SLEEP_TIME_AFTER_FAILED_DB_OPERATION", 60_000)?,
        };

        let ledger = LedgerConfig {
            jobs_graph: env.or("JOBS_GRAPH", "http://mu.semte.ch/graphs/system/jobs"),
            service_name,
            scope: env.get("MU_CALL_SCOPE_ID_DELTA_SYNC"),
        };

        let producer = ProducerConfig {
            base_url: env.required("SYNC_BASE_URL")?,
            files_path: env.or("SYNC_FILES_PATH", "/sync/files"),
            download_path: env.or("DOWNLOAD_FILE_PATH", "/files/:id/download"),
            request_timeout: env.millis("PRODUCER_TIMEOUT_MS", 300_000)?,
        };

        Ok(Self {
            sync,
            updater,
            ledger,
            producer,
            sparql_endpoint: env.or("MU_SPARQL_ENDPOINT", "http://database:8890/sparql"),
            store_timeout: env.millis("STORE_TIMEOUT_MS", 300_000)?,
            dispatch_strategy: env.get("DISPATCH_STRATEGY"),
            sync_interval: env.millis("SYNC_INTERVAL_MS", 60_000)?,
        })
    }
}

/// Log output format: `DSYNC_LOG_FORMAT=json` for JSON lines
pub fn log_json() -> bool {
    std::env::var("DSYNC_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"))
}

/// Directory for a daily rolling log file, in addition to stderr
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("DSYNC_LOG_DIR").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

struct Env<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Env<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn list(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.get(key) {
            Some(value) => {
                value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
            }
            None => default.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn flag(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.get(key) else { return Ok(default) };
        parse_flag(&value).ok_or_else(|| ConfigError::Invalid {
            key,
            value,
            reason: "expected true or false".to_string(),
        })
    }

    fn number<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.get(key) else { return Ok(default) };
        value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid { key, reason: e.to_string(), value })
    }

    fn millis(&self, key: &'static str, default: u64) -> Result<Duration, ConfigError> {
        self.number(key, default).map(Duration::from_millis)
    }

    fn timestamp(&self, key: &'static str) -> Result<Option<DateTime<Utc>>, ConfigError> {
        let Some(value) = self.get(key) else { return Ok(None) };
        DateTime::parse_from_rfc3339(value.trim())
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| ConfigError::Invalid { key, reason: e.to_string(), value })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
