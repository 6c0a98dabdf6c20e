// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta consumer daemon library
//!
//! Environment settings, log setup and the trigger queue used by `dsyncd`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
pub mod logging;
pub mod scheduler;

pub use env::{ConfigError, Settings};
pub use scheduler::{Trigger, TriggerQueue};
