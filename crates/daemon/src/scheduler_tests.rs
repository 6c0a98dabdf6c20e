// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn pending_trigger_absorbs_new_ones() {
    let (queue, _receiver) = queue();
    assert!(queue.push(Trigger::Startup));
    assert!(!queue.push(Trigger::Interval));
}

#[tokio::test]
async fn serve_runs_triggers_in_order_until_queue_closes() {
    let (queue, receiver) = queue();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let worker = {
        let seen = Arc::clone(&seen);
        tokio::spawn(serve(receiver, CancellationToken::new(), move |trigger| {
            let seen = Arc::clone(&seen);
            async move { seen.lock().unwrap().push(trigger) }
        }))
    };

    queue.tx.send(Trigger::Startup).await.unwrap();
    queue.tx.send(Trigger::Interval).await.unwrap();
    drop(queue);
    worker.await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Trigger::Startup, Trigger::Interval]);
}

#[tokio::test]
async fn serve_stops_on_cancel() {
    let (_queue, receiver) = queue();
    let cancel = CancellationToken::new();
    cancel.cancel();
    serve(receiver, cancel, |_| async {}).await;
}

#[tokio::test(start_paused = true)]
async fn tick_pushes_after_each_period() {
    let (queue, mut receiver) = queue();
    let cancel = CancellationToken::new();
    let ticker = tokio::spawn(tick(queue, Duration::from_secs(60), cancel.clone()));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(receiver.rx.try_recv().is_err());

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(receiver.rx.try_recv().unwrap(), Trigger::Interval);

    cancel.cancel();
    ticker.await.unwrap();
}
