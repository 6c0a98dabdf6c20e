// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File synchronization tasks.
//!
//! Every file task shares the common task fields; the kind-specific stage
//! statuses live in [`FileTaskKind`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::TaskId;
use crate::status::{Status, SubStatus};
use crate::vocab::types;

/// Kind-specific payload of a file task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileTaskKind {
    Add { download_attempts: u32, download: SubStatus, remap: SubStatus, moving: SubStatus },
    Remove { remove: SubStatus },
    Update { update: SubStatus },
}

impl FileTaskKind {
    pub fn add() -> Self {
        FileTaskKind::Add {
            download_attempts: 0,
            download: SubStatus::NotStarted,
            remap: SubStatus::NotStarted,
            moving: SubStatus::NotStarted,
        }
    }

    pub fn remove() -> Self {
        FileTaskKind::Remove { remove: SubStatus::NotStarted }
    }

    pub fn update() -> Self {
        FileTaskKind::Update { update: SubStatus::NotStarted }
    }

    /// `rdf:type` distinguishing this kind in the jobs graph.
    pub fn type_uri(&self) -> &'static str {
        match self {
            FileTaskKind::Add { .. } => types::FILE_ADD_TASK,
            FileTaskKind::Remove { .. } => types::FILE_REMOVE_TASK,
            FileTaskKind::Update { .. } => types::FILE_UPDATE_TASK,
        }
    }

    /// Terminal task status implied by the stage statuses, if any.
    ///
    /// Any failed stage fails the task; all stages succeeding completes it.
    pub fn outcome(&self) -> Option<Status> {
        let stages: &[SubStatus] = match self {
            FileTaskKind::Add { download, remap, moving, .. } => &[*download, *remap, *moving],
            FileTaskKind::Remove { remove } => &[*remove],
            FileTaskKind::Update { update } => &[*update],
        };
        if stages.contains(&SubStatus::Failure) {
            Some(Status::Failed)
        } else if stages.iter().all(|s| *s == SubStatus::Success) {
            Some(Status::Success)
        } else {
            None
        }
    }
}

impl std::fmt::Display for FileTaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FileTaskKind::Add { .. } => "add",
            FileTaskKind::Remove { .. } => "remove",
            FileTaskKind::Update { .. } => "update",
        })
    }
}

/// A file task tracking one virtual file through its workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTask {
    pub id: TaskId,
    /// Virtual file URI this task works on
    pub subject: String,
    pub status: Status,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: FileTaskKind,
}

impl FileTask {
    pub fn new(id: TaskId, subject: impl Into<String>, kind: FileTaskKind, now: DateTime<Utc>) -> Self {
        Self { id, subject: subject.into(), status: Status::Scheduled, created: now, modified: now, kind }
    }

    pub fn uri(&self) -> String {
        self.id.uri()
    }
}

#[cfg(test)]
#[path = "file_task_tests.rs"]
mod tests;
