// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job and Task records as persisted in the jobs graph.
//!
//! A Job is one synchronization run. Its Tasks are ordered by `index`;
//! delta-sync Tasks chain to their predecessor through `parents` so the
//! newest consumed delta file can be found from the ledger alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::Status;

crate::define_id! {
    /// `mu:uuid` of a Job.
    pub struct JobId("http://redpencil.data.gift/id/job/");
}

crate::define_id! {
    /// `mu:uuid` of a Task (delta-sync or file-sync).
    pub struct TaskId("http://redpencil.data.gift/id/task/");
}

crate::define_id! {
    /// `mu:uuid` of a results/input data container.
    pub struct ContainerId("http://data.lblod.info/id/dataContainers/");
}

crate::define_id! {
    /// `mu:uuid` of a persisted error resource.
    pub struct ErrorId("http://redpencil.data.gift/id/jobs/error/");
}

/// One synchronization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub operation: String,
    pub creator: String,
    pub status: Status,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// URIs of the tasks that are part of this job
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl Job {
    pub fn uri(&self) -> String {
        self.id.uri()
    }
}

/// One step within a Job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// URI of the owning job
    pub job: String,
    pub operation: String,
    pub status: Status,
    /// Position within the job, persisted as a string
    pub index: String,
    /// URIs of the tasks this one depends on
    #[serde(default)]
    pub parents: Vec<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Task {
    pub fn uri(&self) -> String {
        self.id.uri()
    }
}

/// What a delta-sync task ingested; recorded in its results container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaFileInfo {
    pub timestamp: DateTime<Utc>,
    pub id: String,
    pub name: String,
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            id: JobId = "job-1",
            operation: String = "http://example.com/operations/delta-sync",
            creator: String = "http://example.com/services/consumer",
        }
        set {
            status: Status = Status::Busy,
            created: DateTime<Utc> = DateTime::<Utc>::default(),
            modified: DateTime<Utc> = DateTime::<Utc>::default(),
            tasks: Vec<String> = Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
