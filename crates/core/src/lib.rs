// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dsync-core: RDF model, ledger records and the store seam for the delta consumer

pub mod macros;

pub mod clock;
pub mod delta;
pub mod file_task;
pub mod id;
pub mod job;
pub mod select;
pub mod status;
pub mod store;
pub mod term;
pub mod vocab;

#[cfg(any(test, feature = "test-support"))]
pub mod memory_store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use delta::{parse_change_sets, sort_by_created, ChangeSet, DeltaFile};
pub use file_task::{FileTask, FileTaskKind};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{ContainerId, DeltaFileInfo, ErrorId, Job, JobId, Task, TaskId};
#[cfg(any(test, feature = "test-support"))]
pub use memory_store::{MemoryStore, UpdateCall};
pub use select::{Node, Order, Row, Select};
pub use status::{StageRegression, Status, SubStatus};
pub use store::{StoreError, TripleStore, UpdateMode, SCOPE_HEADER};
pub use term::{escape_string, Pattern, Term, Triple};
