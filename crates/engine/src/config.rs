// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration and the physical-path remapping table.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings shared by the delta pipeline and the file-sync machine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Service name, used in log fields
    pub service_name: String,
    pub job_creator: String,
    pub delta_sync_operation: String,
    pub initial_sync_operation: String,
    /// Fallback watermark when no delta task has succeeded yet
    pub start_from: Option<DateTime<Utc>>,
    pub delta_file_folder: PathBuf,
    pub keep_delta_files: bool,
    pub disable_delta_ingest: bool,
    pub disable_file_ingest: bool,
    pub wait_for_initial_sync: bool,
    pub ingest_graph: String,
    pub temp_file_graph: String,
    pub temp_file_removal_graph: String,
    /// Subject prefixes identifying file metadata in a change set
    pub file_prefixes: Vec<String>,
    /// Local directory backing `share://` URIs
    pub file_folder: PathBuf,
    pub remapping: Remapping,
    pub max_download_attempts: u32,
    pub file_sync_concurrency: usize,
    /// Scope for staging-graph writes made by the file-sync machine
    pub file_scope: Option<String>,
}

impl SyncConfig {
    pub fn is_file_subject(&self, uri: &str) -> bool {
        self.file_prefixes.iter().any(|p| uri.starts_with(p.as_str()))
    }
}

#[derive(Debug, Error)]
pub enum RemapError {
    #[error("cannot read remapping file {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid remapping file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// Directory remapping for physical file URIs.
///
/// Keys are source directories as absolute paths inside the share
/// (`"/2024/invoices"`), values are target directories. A file whose
/// directory has no entry stays where it is.
///
/// ```toml
/// [remap]
/// "/legacy/uploads" = "documents/uploads"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Remapping {
    #[serde(default)]
    remap: IndexMap<String, String>,
}

impl Remapping {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self { remap: entries.into_iter().collect() }
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, RemapError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| RemapError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&text).map_err(|source| RemapError::Parse { path: path.to_path_buf(), source })
    }

    pub fn len(&self) -> usize {
        self.remap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remap.is_empty()
    }

    /// New `share://` URI for `share_uri`, or `None` when no remap applies.
    /// An entry mapping a directory onto itself is no remap.
    pub fn apply(&self, share_uri: &str) -> Option<String> {
        let path = share_uri.strip_prefix("share://")?;
        let (dir, name) = path.rsplit_once('/').unwrap_or(("", path));
        let key = format!("/{}", dir.trim_matches('/'));
        let target = self.remap.get(&key)?.trim_matches('/');
        let remapped = if target.is_empty() {
            format!("share://{name}")
        } else {
            format!("share://{target}/{name}")
        };
        (remapped != share_uri).then_some(remapped)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
