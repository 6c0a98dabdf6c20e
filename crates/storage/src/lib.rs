// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dsync-storage: batched store writes and the Job/Task ledger

mod ledger;
mod resource;
mod updater;

pub use ledger::{Ledger, LedgerConfig, LedgerError};
pub use resource::{describe, subjects, Resource};
pub use updater::{with_retry, Updater, UpdaterConfig};
