// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interval ticker and the single-consumer trigger queue.
//!
//! Every trigger goes through one bounded queue drained by one worker, so
//! two syncs never overlap in this process. While a sync is queued, further
//! triggers are dropped rather than piling up.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Interval,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Startup => write!(f, "startup"),
            Trigger::Interval => write!(f, "interval"),
        }
    }
}

#[derive(Clone)]
pub struct TriggerQueue {
    tx: mpsc::Sender<Trigger>,
}

pub struct TriggerReceiver {
    rx: mpsc::Receiver<Trigger>,
}

pub fn queue() -> (TriggerQueue, TriggerReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (TriggerQueue { tx }, TriggerReceiver { rx })
}

impl TriggerQueue {
    /// Enqueue unless a trigger is already waiting. Returns whether it was
    /// queued.
    pub fn push(&self, trigger: Trigger) -> bool {
        match self.tx.try_send(trigger) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(%trigger, "sync already queued, dropping trigger");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Push an interval trigger every `period` until cancelled.
pub async fn tick(queue: TriggerQueue, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; startup is triggered separately.
    interval.tick().await;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                queue.push(Trigger::Interval);
            }
        }
    }
}

/// Run `handler` for each trigger, one at a time, until cancelled or every
/// queue handle is dropped. A running handler is allowed to finish.
pub async fn serve<F, Fut>(mut receiver: TriggerReceiver, cancel: CancellationToken, mut handler: F)
where
    F: FnMut(Trigger) -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        let trigger = tokio::select! {
            _ = cancel.cancelled() => break,
            next = receiver.rx.recv() => match next {
                Some(trigger) => trigger,
                None => break,
            },
        };
        info!(%trigger, "sync triggered");
        handler(trigger).await;
    }
    info!("trigger queue stopped");
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
