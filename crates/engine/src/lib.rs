// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dsync-engine: delta pipeline, file-sync state machine and dispatch hook

pub mod config;
pub mod consumer;
pub mod delta;
pub mod dispatch;
pub mod file_sync;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::{RemapError, Remapping, SyncConfig};
pub use consumer::{Consumer, SyncReport};
pub use delta::{DeltaOutcome, DeltaSync, SyncError};
pub use dispatch::{Dispatcher, DispatcherRegistry, PassthroughDispatcher, SingleGraphDispatcher};
pub use file_sync::{FileSync, FileSyncError, FileSyncReport};
