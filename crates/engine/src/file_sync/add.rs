// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Add workflow: download, remap, move metadata into the ingest graph.

use dsync_adapters::ProducerAdapter;
use dsync_core::vocab;
use dsync_core::{Clock, FileTask, FileTaskKind, Pattern, SubStatus, Term, Triple, TripleStore};
use dsync_storage::describe;
use tracing::{debug, info};

use super::{metadata, share, FileSync, FileSyncError, Step};

/// Schedule an Add task for every staged virtual file that is neither
/// quarantined nor already covered by an open task.
pub(super) async fn schedule<S, P, C>(
    sync: &FileSync<S, P, C>,
    open: &[FileTask],
) -> Result<Vec<FileTask>, FileSyncError>
where
    S: TripleStore,
    P: ProducerAdapter,
    C: Clock,
{
    let graph = &sync.config.temp_file_graph;
    let failed = sync.ledger.failed_subjects(graph).await?;
    let mut scheduled = Vec::new();
    for vuri in metadata::staged_files(sync.store(), graph).await? {
        if failed.contains(&vuri) || open.iter().any(|t| t.subject == vuri) {
            continue;
        }
        scheduled.push(sync.ledger.create_file_task(&vuri, FileTaskKind::add()).await?);
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
    let FileTaskKind::Add { download_attempts, download, remap, moving } = &mut task.kind else {
        return Ok(Step::Waiting);
    };
    match (*download, *remap, *moving) {
        (SubStatus::NotStarted, _, _) => download.advance(SubStatus::Ongoing)?,
        (SubStatus::Ongoing, _, _) => {
            let attempt = sync.download(&vuri).await;
            *download_attempts += 1;
            match attempt {
                Ok(()) => download.advance(SubStatus::Success)?,
                Err(e) => {
                    sync.record_stage_error(&uri, "download", &e).await?;
                    if *download_attempts < sync.config.max_download_attempts {
                        debug!(task = %uri, attempts = *download_attempts, "download will be retried");
                        return Ok(Step::Waiting);
                    }
                    download.advance(SubStatus::Failure)?;
                }
            }
        }
        (SubStatus::Success, SubStatus::NotStarted, _) => remap.advance(SubStatus::Ongoing)?,
        (SubStatus::Success, SubStatus::Ongoing, _) => match sync.remap(&vuri).await {
            Ok(true) => remap.advance(SubStatus::Success)?,
            Ok(false) => return Ok(Step::Waiting),
            Err(e) => {
                sync.record_stage_error(&uri, "remap", &e).await?;
                remap.advance(SubStatus::Failure)?;
            }
        },
        (SubStatus::Success, SubStatus::Success, SubStatus::NotStarted) => {
            moving.advance(SubStatus::Ongoing)?
        }
        (SubStatus::Success, SubStatus::Success, SubStatus::Ongoing) => {
            match sync.move_metadata(&vuri).await {
                Ok(true) => moving.advance(SubStatus::Success)?,
                Ok(false) => return Ok(Step::Waiting),
                Err(e) => {
                    sync.record_stage_error(&uri, "move", &e).await?;
                    moving.advance(SubStatus::Failure)?;
                }
            }
        }
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
    /// One download attempt for the body of `vuri`. A body already on disk
    /// is kept as is.
    async fn download(&self, vuri: &str) -> Result<(), FileSyncError> {
        let graph = &self.config.temp_file_graph;
        let puri = metadata::physical_of(self.store(), graph, vuri).await?.ok_or_else(|| {
            FileSyncError::MissingPhysical { vuri: vuri.to_string(), graph: graph.clone() }
        })?;
        let path = share::share_path(&self.config.file_folder, &puri)?;
        if share::exists(&path).await? {
            info!(%vuri, path = %path.display(), "file already on local storage, not downloading again");
            return Ok(());
        }
        let virtual_file = describe(self.store(), graph, vuri).await?;
        let vuuid = virtual_file
            .first(vocab::MU_UUID)
            .map(Term::value)
            .ok_or_else(|| FileSyncError::MissingUuid { vuri: vuri.to_string() })?;
        self.producer.download(vuuid, &path).await?;
        info!(%vuri, path = %path.display(), "downloaded file");
        Ok(())
    }

    /// Move the body and rewrite the staged physical identity when the
    /// remapping table has an entry for its directory. Returns `false`
    /// while the staged metadata is incomplete.
    async fn remap(&self, vuri: &str) -> Result<bool, FileSyncError> {
        let graph = &self.config.temp_file_graph;
        let Some(file) = metadata::load(self.store(), graph, vuri).await? else {
            return Ok(false);
        };
        if !file.is_complete() {
            debug!(%vuri, "metadata incomplete, remap postponed");
            return Ok(false);
        }
        let Some(target) = self.config.remapping.apply(&file.puri) else {
            return Ok(true);
        };
        let folder = &self.config.file_folder;
        share::move_body(&share::share_path(folder, &file.puri)?, &share::share_path(folder, &target)?)
            .await?;

        let mut stale = file.physical_file.triples();
        let referring = Pattern::in_graph(graph).object(Term::uri(file.puri.clone()));
        stale.extend(self.store().select(&referring).await?.into_iter().map(|t| Triple { graph: None, ..t }));
        let mut fresh: Vec<Triple> = stale.iter().map(|t| t.rewrite_uri(&file.puri, &target)).collect();
        fresh.push(Triple::new(Term::uri(target.clone()), vocab::DCT_REPLACES, Term::uri(file.puri.clone())));

        let updater = self.ledger.updater();
        updater.delete(graph, &stale, self.scope()).await?;
        updater.insert(graph, &fresh, self.scope()).await?;
        info!(%vuri, from = %file.puri, to = %target, "remapped physical file");
        Ok(true)
    }

    /// Copy the complete description into the ingest graph and drop it from
    /// staging. Returns `false` while the staged metadata is incomplete.
    async fn move_metadata(&self, vuri: &str) -> Result<bool, FileSyncError> {
        let graph = &self.config.temp_file_graph;
        let Some(file) = metadata::load(self.store(), graph, vuri).await? else {
            return Ok(false);
        };
        if !file.is_complete() {
            debug!(%vuri, "metadata incomplete, move postponed");
            return Ok(false);
        }
        let triples = file.triples();
        let updater = self.ledger.updater();
        updater.insert(&self.config.ingest_graph, &triples, None).await?;
        updater.delete(graph, &triples, self.scope()).await?;
        info!(%vuri, puri = %file.puri, statements = triples.len(), "moved file metadata to ingest graph");
        Ok(true)
    }
}

