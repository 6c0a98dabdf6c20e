// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dsyncd`: consumes producer delta files into the triple store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dsync_adapters::{HttpProducer, SparqlStore};
use dsync_core::{vocab, Pattern, SystemClock, TripleStore, UuidIdGen};
use dsync_daemon::scheduler::{self, Trigger};
use dsync_daemon::{env, logging, Settings};
use dsync_engine::{Consumer, DispatcherRegistry};
use dsync_storage::{with_retry, Ledger, Updater};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

type Daemon = Consumer<SparqlStore, HttpProducer, SystemClock>;

#[derive(Parser)]
#[command(name = "dsyncd", version, about = "Delta consumer for a SPARQL triple store")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sync on startup and then on every interval until interrupted (default)
    Run,
    /// Run one delta sync followed by one file-sync pass, then exit.
    /// Busy jobs are left alone, so this is safe next to a running service
    DeltaSync,
    /// Run one file-sync pass over already staged metadata, then exit
    FileSync,
    /// Delete every job of an operation, with its tasks
    CleanupJobs {
        /// Operation URI; defaults to the delta sync operation
        #[arg(long)]
        operation: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(env::log_json(), env::log_dir().as_deref())?;

    let settings = Settings::from_env().context("invalid configuration")?;
    let consumer = build(&settings).await?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(consumer, &settings).await?,
        Command::DeltaSync => {
            let report = consumer.sync().await;
            info!(%report, "sync finished");
        }
        Command::FileSync => {
            let report = consumer.file_sync().await;
            info!(%report, "file sync finished");
        }
        Command::CleanupJobs { operation } => {
            let operation = operation.unwrap_or_else(|| settings.sync.delta_sync_operation.clone());
            let removed = consumer.cleanup_jobs(&operation).await?;
            println!("removed {removed} job(s) of {operation}");
        }
    }
    Ok(())
}

async fn build(settings: &Settings) -> anyhow::Result<Daemon> {
    let store = SparqlStore::new(settings.sparql_endpoint.clone(), settings.store_timeout)?;
    wait_for_store(&store, settings).await?;

    let ledger = Ledger::new(
        Updater::new(store, settings.updater.clone()),
        SystemClock,
        Arc::new(UuidIdGen),
        settings.ledger.clone(),
    );
    let producer = HttpProducer::new(settings.producer.clone())?;
    let dispatcher = DispatcherRegistry::new()
        .resolve(settings.dispatch_strategy.as_deref(), &settings.sync.ingest_graph);

    Ok(Consumer::new(ledger, producer, dispatcher, Arc::new(settings.sync.clone())))
}

/// Probe the jobs graph until the store answers, using the db retry budget.
async fn wait_for_store(store: &SparqlStore, settings: &Settings) -> anyhow::Result<()> {
    let probe = Pattern::in_graph(settings.ledger.jobs_graph.clone()).predicate(vocab::RDF_TYPE);
    with_retry(
        "store probe",
        settings.updater.max_attempts,
        settings.updater.retry_backoff,
        || store.select(&probe),
    )
    .await
    .with_context(|| format!("triple store at {} is unreachable", store.endpoint()))?;
    info!(endpoint = store.endpoint(), "triple store reachable");
    Ok(())
}

async fn run(consumer: Daemon, settings: &Settings) -> anyhow::Result<()> {
    let failed = consumer.startup().await?;
    if !failed.is_empty() {
        warn!(jobs = failed.len(), "failed jobs left busy by a previous run");
    }

    let cancel = CancellationToken::new();
    let (queue, receiver) = scheduler::queue();
    queue.push(Trigger::Startup);

    let ticker = tokio::spawn(scheduler::tick(queue, settings.sync_interval, cancel.clone()));
    let shutdown = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown requested");
            cancel.cancel();
        })
    };

    info!(interval_ms = settings.sync_interval.as_millis() as u64, "delta consumer running");
    let consumer = &consumer;
    scheduler::serve(receiver, cancel.clone(), move |trigger| async move {
        let report = consumer.sync().await;
        info!(%trigger, %report, "sync finished");
    })
    .await;

    cancel.cancel();
    shutdown.abort();
    ticker.await?;
    Ok(())
}
