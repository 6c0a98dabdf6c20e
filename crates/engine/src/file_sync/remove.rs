// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remove workflow: drop a file's metadata from the ingest graph and its
//! body from the shared volume.

use dsync_adapters::ProducerAdapter;
use dsync_core::{Clock, FileTask, FileTaskKind, SubStatus, Triple, TripleStore};
use dsync_storage::describe;
use tracing::{debug, info};

use super::{metadata, share, FileSync, FileSyncError, Step};

pub(super) async fn schedule<S, P, C>(
    sync: &FileSync<S, P, C>,
    open: &[FileTask],
) -> Result<Vec<FileTask>, FileSyncError>
where
    S: TripleStore,
    P: ProducerAdapter,
    C: Clock,
{
    let graph = &sync.config.temp_file_removal_graph;
    let failed = sync.ledger.failed_subjects(graph).await?;
    let mut scheduled = Vec::new();
    for vuri in metadata::staged_files(sync.store(), graph).await? {
        if failed.contains(&vuri) || open.iter().any(|t| t.subject == vuri) {
            continue;
        }
        let complete = metadata::load(sync.store(), graph, &vuri).await?.is_some_and(|f| f.is_complete());
        if !complete {
            debug!(%vuri, "removal metadata incomplete, not scheduling yet");
            continue;
        }
        scheduled.push(sync.ledger.create_file_task(&vuri, FileTaskKind::remove()).await?);
    }
    Ok(scheduled)
}

pub(super) async fn step<S, P, C>(
    sync: &FileSync<S, P, C>,
    task: &mut FileTask,
) -> Result<Step, FileSyncError>
where
    S: TripleStore,
    P: ProducerAdapter,
    C: Clock,
{
    let uri = task.uri();
    let vuri = task.subject.clone();
    let FileTaskKind::Remove { remove } = &mut task.kind else {
        return Ok(Step::Waiting);
    };
    match *remove {
        SubStatus::NotStarted => remove.advance(SubStatus::Ongoing)?,
        SubStatus::Ongoing => match sync.remove_file(&vuri).await {
            Ok(true) => remove.advance(SubStatus::Success)?,
            Ok(false) => return Ok(Step::Waiting),
            Err(e) => {
                sync.record_stage_error(&uri, "remove", &e).await?;
                remove.advance(SubStatus::Failure)?;
            }
        },
        _ => return Ok(Step::Waiting),
    }
    Ok(Step::Progressed)
}

impl<S, P, C> FileSync<S, P, C>
where
    S: TripleStore,
    P: ProducerAdapter,
    C: Clock,
{
    /// Returns `false` while the removal metadata is incomplete.
    async fn remove_file(&self, vuri: &str) -> Result<bool, FileSyncError> {
        let staging = &self.config.temp_file_removal_graph;
        let ingest = &self.config.ingest_graph;
        let Some(file) = metadata::load(self.store(), staging, vuri).await? else {
            return Ok(false);
        };
        if !file.is_complete() {
            return Ok(false);
        }
        let current = metadata::current_identity(self.store(), ingest, &file.puri).await?;
        let path = share::share_path(&self.config.file_folder, &current)?;

        let mut stale: Vec<Triple> = describe(self.store(), ingest, vuri).await?.triples();
        stale.extend(describe(self.store(), ingest, &current).await?.triples());
        let updater = self.ledger.updater();
        updater.delete(ingest, &stale, None).await?;
        updater.delete(staging, &file.triples(), self.scope()).await?;

        if !share::delete_body(&path).await? {
            debug!(path = %path.display(), "file body already gone");
        }
        info!(%vuri, puri = %current, statements = stale.len(), "removed file");
        Ok(true)
    }
}
