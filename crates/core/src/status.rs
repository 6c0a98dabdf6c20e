// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status vocabularies for jobs, tasks and file-sync stages.

use serde::{Deserialize, Serialize};

/// Status of a Job or Task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Scheduled,
    Busy,
    Success,
    Failed,
    Canceled,
}

impl Status {
    /// Whether this status is terminal (no further transitions expected)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Success | Status::Failed | Status::Canceled)
    }

    /// Terminal statuses are never left; everything else may move anywhere.
    pub fn can_transition_to(&self, next: Status) -> bool {
        !self.is_terminal() || *self == next
    }
}

crate::simple_display! {
    Status {
        Scheduled => "scheduled",
        Busy => "busy",
        Success => "success",
        Failed => "failed",
        Canceled => "canceled",
    }
}

crate::uri_enum! {
    Status {
        Scheduled => "http://redpencil.data.gift/id/concept/JobStatus/scheduled",
        Busy => "http://redpencil.data.gift/id/concept/JobStatus/busy",
        Success => "http://redpencil.data.gift/id/concept/JobStatus/success",
        Failed => "http://redpencil.data.gift/id/concept/JobStatus/failed",
        Canceled => "http://redpencil.data.gift/id/concept/JobStatus/canceled",
    }
}

/// Status of one stage of a file-sync task (download, remap, move, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubStatus {
    NotStarted,
    Ongoing,
    Success,
    Failure,
}

/// Attempted backwards move of a stage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stage status cannot move from {from} to {to}")]
pub struct StageRegression {
    pub from: SubStatus,
    pub to: SubStatus,
}

impl SubStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubStatus::Success | SubStatus::Failure)
    }

    /// Move forward to `next`. Staying put is allowed; going back to
    /// `not-started` or leaving a terminal status is not.
    pub fn advance(&mut self, next: SubStatus) -> Result<(), StageRegression> {
        let allowed = *self == next
            || match self {
                SubStatus::NotStarted => next != SubStatus::NotStarted,
                SubStatus::Ongoing => next.is_terminal(),
                SubStatus::Success | SubStatus::Failure => false,
            };
        if !allowed {
            return Err(StageRegression { from: *self, to: next });
        }
        *self = next;
        Ok(())
    }
}

crate::simple_display! {
    SubStatus {
        NotStarted => "not-started",
        Ongoing => "ongoing",
        Success => "success",
        Failure => "failure",
    }
}

crate::uri_enum! {
    SubStatus {
        NotStarted => "http://redpencil.data.gift/id/concept/FileSyncStatus/not-started",
        Ongoing => "http://redpencil.data.gift/id/concept/FileSyncStatus/ongoing",
        Success => "http://redpencil.data.gift/id/concept/FileSyncStatus/success",
        Failure => "http://redpencil.data.gift/id/concept/FileSyncStatus/failure",
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
