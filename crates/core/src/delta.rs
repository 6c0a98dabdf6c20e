// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta files and the change sets they carry.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::term::Triple;

/// One decoded unit of a delta file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub inserts: Vec<Triple>,
    #[serde(default)]
    pub deletes: Vec<Triple>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.deletes.is_empty()
    }
}

/// Decode the body of a delta file (a JSON array of change sets).
pub fn parse_change_sets(body: &[u8]) -> Result<Vec<ChangeSet>, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Descriptor of a remote delta file as announced by the producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaFile {
    pub id: String,
    pub created: DateTime<Utc>,
    pub name: String,
}

impl DeltaFile {
    /// `{folder}/{created}-{id}.json`
    pub fn local_path(&self, folder: &Path) -> PathBuf {
        let created = self.created.to_rfc3339_opts(SecondsFormat::Millis, true);
        folder.join(format!("{created}-{}.json", self.id))
    }
}

/// Sort ascending by creation time; ties keep delivery order.
pub fn sort_by_created(files: &mut [DeltaFile]) {
    files.sort_by_key(|f| f.created);
}

#[cfg(test)]
#[path = "delta_tests.rs"]
mod tests;
