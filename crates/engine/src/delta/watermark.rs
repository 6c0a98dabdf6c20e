// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use dsync_core::{Clock, TripleStore};
use dsync_storage::Ledger;
use tracing::{debug, info};

use super::SyncError;
use crate::config::SyncConfig;

/// Point from which to fetch delta files: the newest delta file recorded by
/// a successful Task of this consumer, else the configured start timestamp.
pub async fn watermark<S: TripleStore, C: Clock>(
    ledger: &Ledger<S, C>,
    config: &SyncConfig,
) -> Result<DateTime<Utc>, SyncError> {
    let operations = [config.delta_sync_operation.as_str(), config.initial_sync_operation.as_str()];
    match ledger.latest_delta_timestamp(&config.job_creator, &operations).await? {
        Some(latest) => {
            debug!(file = %latest.id, timestamp = %latest.timestamp, "watermark from ledger");
            Ok(latest.timestamp)
        }
        None => {
            let start = config.start_from.ok_or(SyncError::NoWatermark)?;
            info!(%start, "no consumed delta files yet, using configured start timestamp");
            Ok(start)
        }
    }
}

#[cfg(test)]
#[path = "watermark_tests.rs"]
mod tests;
