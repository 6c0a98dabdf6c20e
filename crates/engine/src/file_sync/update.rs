// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Update workflow: staged statements about a file that is already in the
//! ingest graph replace the values stored there.
//!
//! The staged subject may be an identity that has since been remapped; the
//! statements are applied to whatever replaced it.

use dsync_adapters::ProducerAdapter;
use dsync_core::vocab::types;
use dsync_core::{Clock, FileTask, FileTaskKind, Pattern, SubStatus, Term, Triple, TripleStore};
use dsync_storage::{describe, Resource};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

use super::{metadata, FileSync, FileSyncError, Step};

pub(super) async fn schedule<S, P, C>(
    sync: &FileSync<S, P, C>,
    open: &[FileTask],
) -> Result<Vec<FileTask>, FileSyncError>
where
    S: TripleStore,
    P: ProducerAdapter,
    C: Clock,
{
    let staging = &sync.config.temp_file_graph;
    let mut skip: HashSet<String> = sync.ledger.failed_subjects(staging).await?;
    skip.extend(open.iter().map(|t| t.subject.clone()));
    for add in sync.ledger.open_file_tasks(types::FILE_ADD_TASK).await? {
        if let Some(puri) = metadata::physical_of(sync.store(), staging, &add.subject).await? {
            skip.insert(puri);
        }
        skip.insert(add.subject);
    }

    let mut scheduled = Vec::new();
    for (subject, staged) in staged_subjects(sync.store(), staging).await? {
        if skip.contains(&subject) {
            continue;
        }
        if sync.existing_values(&subject, &staged).await?.is_empty() {
            continue;
        }
        scheduled.push(sync.ledger.create_file_task(&subject, FileTaskKind::update()).await?);
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
    let subject = task.subject.clone();
    let FileTaskKind::Update { update } = &mut task.kind else {
        return Ok(Step::Waiting);
    };
    match *update {
        SubStatus::NotStarted => update.advance(SubStatus::Ongoing)?,
        SubStatus::Ongoing => match sync.update_file(&subject).await {
            Ok(()) => update.advance(SubStatus::Success)?,
            Err(e) => {
                sync.record_stage_error(&uri, "update", &e).await?;
                update.advance(SubStatus::Failure)?;
            }
        },
        _ => return Ok(Step::Waiting),
    }
    Ok(Step::Progressed)
}

/// Staged statements grouped by URI subject.
async fn staged_subjects<S: TripleStore>(
    store: &S,
    graph: &str,
) -> Result<BTreeMap<String, Resource>, FileSyncError> {
    let mut grouped: BTreeMap<String, Vec<Triple>> = BTreeMap::new();
    for t in store.select(&Pattern::in_graph(graph)).await? {
        if let Some(subject) = t.subject.as_uri() {
            grouped.entry(subject.to_string()).or_default().push(t);
        }
    }
    Ok(grouped
        .into_iter()
        .map(|(subject, triples)| {
            let resource = Resource::from_triples(subject.clone(), triples);
            (subject, resource)
        })
        .collect())
}

impl<S, P, C> FileSync<S, P, C>
where
    S: TripleStore,
    P: ProducerAdapter,
    C: Clock,
{
    /// Ingested values of `staged`'s predicates on the current identity of
    /// `subject`. Only predicates already present are considered.
    async fn existing_values(&self, subject: &str, staged: &Resource) -> Result<Vec<Triple>, FileSyncError> {
        let ingest = &self.config.ingest_graph;
        let current = metadata::current_identity(self.store(), ingest, subject).await?;
        let stored = describe(self.store(), ingest, &current).await?;
        Ok(staged.predicates().flat_map(|p| stored.triples_for(p)).collect())
    }

    async fn update_file(&self, subject: &str) -> Result<(), FileSyncError> {
        let staging = &self.config.temp_file_graph;
        let ingest = &self.config.ingest_graph;
        let staged = describe(self.store(), staging, subject).await?;
        let current = metadata::current_identity(self.store(), ingest, subject).await?;
        let stored = describe(self.store(), ingest, &current).await?;

        let mut old = Vec::new();
        let mut new = Vec::new();
        let mut consumed = Vec::new();
        for predicate in staged.predicates() {
            if !stored.has(predicate) {
                continue;
            }
            old.extend(stored.triples_for(predicate));
            for t in staged.triples_for(predicate) {
                new.push(Triple { subject: Term::uri(current.clone()), ..t.clone() });
                consumed.push(t);
            }
        }

        let updater = self.ledger.updater();
        updater.delete(ingest, &old, None).await?;
        updater.insert(ingest, &new, None).await?;
        updater.delete(staging, &consumed, self.scope()).await?;
        info!(%subject, %current, replaced = old.len(), inserted = new.len(), "updated file metadata");
        Ok(())
    }
}
