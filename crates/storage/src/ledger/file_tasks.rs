// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence of file-sync tasks.
//!
//! A task is written as a full description; saving progress diffs the old
//! and new descriptions and only touches the statements that changed.

use dsync_core::vocab::{self, types};
use dsync_core::{
    Clock, FileTask, FileTaskKind, Pattern, Status, SubStatus, TaskId, Term, Triple, TripleStore,
};
use std::collections::BTreeSet;
use tracing::debug;

use super::{Ledger, LedgerError};
use crate::resource::{describe, subjects, Resource};

fn file_task_triples(task: &FileTask) -> Vec<Triple> {
    let uri = task.uri();
    let s = || Term::uri(uri.clone());
    let mut triples = vec![
        Triple::new(s(), vocab::RDF_TYPE, Term::uri(types::SYNC_TASK)),
        Triple::new(s(), vocab::RDF_TYPE, Term::uri(task.kind.type_uri())),
        Triple::new(s(), vocab::MU_UUID, Term::literal(task.id.as_str())),
        Triple::new(s(), vocab::EXT_SUBJECT, Term::uri(task.subject.clone())),
        Triple::new(s(), vocab::ADMS_STATUS, Term::uri(task.status.uri())),
        Triple::new(s(), vocab::DCT_CREATED, Term::date_time(task.created)),
        Triple::new(s(), vocab::DCT_MODIFIED, Term::date_time(task.modified)),
    ];
    let mut stage = |predicate: &str, status: SubStatus| {
        triples.push(Triple::new(s(), predicate, Term::uri(status.uri())));
    };
    match task.kind {
        FileTaskKind::Add { download_attempts, download, remap, moving } => {
            stage(vocab::EXT_DOWNLOAD_STATUS, download);
            stage(vocab::EXT_REMAPPING_STATUS, remap);
            stage(vocab::EXT_MOVING_STATUS, moving);
            triples.push(Triple::new(
                s(),
                vocab::EXT_DOWNLOAD_ATTEMPTS,
                Term::integer(i64::from(download_attempts)),
            ));
        }
        FileTaskKind::Remove { remove } => stage(vocab::EXT_REMOVE_STATUS, remove),
        FileTaskKind::Update { update } => stage(vocab::EXT_UPDATE_STATUS, update),
    }
    triples
}

fn stage_of(r: &Resource, predicate: &str) -> SubStatus {
    r.first_uri(predicate).and_then(SubStatus::from_uri).unwrap_or(SubStatus::NotStarted)
}

fn parse_file_task(r: &Resource) -> Result<FileTask, LedgerError> {
    let malformed = |reason: &str| LedgerError::Malformed { uri: r.uri.clone(), reason: reason.to_string() };
    let kind = if r.has_type(types::FILE_ADD_TASK) {
        FileTaskKind::Add {
            download_attempts: r
                .first(vocab::EXT_DOWNLOAD_ATTEMPTS)
                .and_then(Term::as_integer)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            download: stage_of(r, vocab::EXT_DOWNLOAD_STATUS),
            remap: stage_of(r, vocab::EXT_REMAPPING_STATUS),
            moving: stage_of(r, vocab::EXT_MOVING_STATUS),
        }
    } else if r.has_type(types::FILE_REMOVE_TASK) {
        FileTaskKind::Remove { remove: stage_of(r, vocab::EXT_REMOVE_STATUS) }
    } else if r.has_type(types::FILE_UPDATE_TASK) {
        FileTaskKind::Update { update: stage_of(r, vocab::EXT_UPDATE_STATUS) }
    } else {
        return Err(malformed("unknown file task type"));
    };
    let id = r.first(vocab::MU_UUID).map(|t| t.value()).ok_or_else(|| malformed("missing mu:uuid"))?;
    let date = |p: &str| r.first(p).and_then(Term::as_date_time).ok_or_else(|| malformed(p));
    Ok(FileTask {
        id: TaskId::new(id),
        subject: r.first_uri(vocab::EXT_SUBJECT).ok_or_else(|| malformed("missing ext:subject"))?.to_string(),
        status: r
            .first_uri(vocab::ADMS_STATUS)
            .and_then(Status::from_uri)
            .ok_or_else(|| LedgerError::MissingStatus { uri: r.uri.clone() })?,
        created: date(vocab::DCT_CREATED)?,
        modified: date(vocab::DCT_MODIFIED)?,
        kind,
    })
}

impl<S: TripleStore, C: Clock> Ledger<S, C> {
    /// Persist a new scheduled task for `subject`.
    pub async fn create_file_task(
        &self,
        subject: &str,
        kind: FileTaskKind,
    ) -> Result<FileTask, LedgerError> {
        let task = FileTask::new(TaskId::new(self.next_id()), subject, kind, self.now());
        self.insert(&file_task_triples(&task)).await?;
        debug!(task = %task.uri(), %subject, kind = %task.kind, "scheduled file task");
        Ok(task)
    }

    /// Write the progress from `before` to `after`, stamping `after` as
    /// modified now. Nothing is written when nothing changed.
    pub async fn save_file_task(
        &self,
        before: &FileTask,
        after: &mut FileTask,
    ) -> Result<(), LedgerError> {
        if before == after {
            return Ok(());
        }
        after.modified = self.now();
        let old: BTreeSet<Triple> = file_task_triples(before).into_iter().collect();
        let new: BTreeSet<Triple> = file_task_triples(after).into_iter().collect();
        let stale: Vec<Triple> = old.difference(&new).cloned().collect();
        let fresh: Vec<Triple> = new.difference(&old).cloned().collect();
        self.delete(&stale).await?;
        self.insert(&fresh).await?;
        Ok(())
    }

    /// All file tasks of the kind identified by `type_uri`.
    pub async fn file_tasks(&self, type_uri: &str) -> Result<Vec<FileTask>, LedgerError> {
        let graph = &self.config.jobs_graph;
        let pattern = Pattern::in_graph(graph).predicate(vocab::RDF_TYPE).object(Term::uri(type_uri));
        let mut tasks = Vec::new();
        for uri in subjects(self.store(), &pattern).await? {
            tasks.push(parse_file_task(&describe(self.store(), graph, &uri).await?)?);
        }
        tasks.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }

    /// File tasks of a kind that have not reached a terminal status.
    pub async fn open_file_tasks(&self, type_uri: &str) -> Result<Vec<FileTask>, LedgerError> {
        let mut tasks = self.file_tasks(type_uri).await?;
        tasks.retain(|t| !t.status.is_terminal());
        Ok(tasks)
    }

    pub async fn load_file_task(&self, uri: &str) -> Result<Option<FileTask>, LedgerError> {
        let r = describe(self.store(), &self.config.jobs_graph, uri).await?;
        if !r.has_type(types::SYNC_TASK) {
            return Ok(None);
        }
        parse_file_task(&r).map(Some)
    }
}

#[cfg(test)]
#[path = "file_tasks_tests.rs"]
mod tests;
