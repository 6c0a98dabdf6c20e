// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jobs, tasks and the delta-sync watermark.

use chrono::{DateTime, Utc};
use dsync_core::vocab::{self, operations, types};
use dsync_core::{
    Clock, ContainerId, DeltaFile, DeltaFileInfo, Job, JobId, Node, Order, Pattern, Row, Select,
    Status, Task, TaskId, Term, Triple, TripleStore,
};
use tracing::{info, warn};

use super::{Ledger, LedgerError};
use crate::resource::{describe, subjects, Resource};

fn stmt(subject: &str, predicate: &str, object: Term) -> Triple {
    Triple::new(Term::uri(subject), predicate, object)
}

fn status_of(r: &Resource) -> Result<Status, LedgerError> {
    r.first_uri(vocab::ADMS_STATUS)
        .and_then(Status::from_uri)
        .ok_or_else(|| LedgerError::MissingStatus { uri: r.uri.clone() })
}

fn date_of(r: &Resource, predicate: &str) -> Result<DateTime<Utc>, LedgerError> {
    r.first(predicate).and_then(Term::as_date_time).ok_or_else(|| LedgerError::Malformed {
        uri: r.uri.clone(),
        reason: format!("missing or invalid {predicate}"),
    })
}

fn value_of(r: &Resource, predicate: &str) -> String {
    r.first(predicate).map(|t| t.value().to_string()).unwrap_or_default()
}

fn uuid_of(r: &Resource) -> Result<String, LedgerError> {
    r.first(vocab::MU_UUID).map(|t| t.value().to_string()).ok_or_else(|| LedgerError::Malformed {
        uri: r.uri.clone(),
        reason: "missing mu:uuid".to_string(),
    })
}

impl<S: TripleStore, C: Clock> Ledger<S, C> {
    /// Create a busy Job for `operation`. Refuses while another Job for the
    /// same operation is busy.
    pub async fn create_job(&self, operation: &str, creator: &str) -> Result<Job, LedgerError> {
        let busy = self.get_jobs(operation, &[Status::Busy], &[]).await?;
        if let Some(running) = busy.first() {
            return Err(LedgerError::AlreadyRunning {
                operation: operation.to_string(),
                job: running.uri(),
            });
        }
        let now = self.now();
        let job = Job {
            id: JobId::new(self.next_id()),
            operation: operation.to_string(),
            creator: creator.to_string(),
            status: Status::Busy,
            created: now,
            modified: now,
            tasks: Vec::new(),
        };
        let uri = job.uri();
        self.insert(&[
            stmt(&uri, vocab::RDF_TYPE, Term::uri(types::JOB)),
            stmt(&uri, vocab::MU_UUID, Term::literal(job.id.as_str())),
            stmt(&uri, vocab::DCT_CREATOR, Term::uri(creator)),
            stmt(&uri, vocab::ADMS_STATUS, Term::uri(job.status.uri())),
            stmt(&uri, vocab::DCT_CREATED, Term::date_time(now)),
            stmt(&uri, vocab::DCT_MODIFIED, Term::date_time(now)),
            stmt(&uri, vocab::TASK_OPERATION, Term::uri(operation)),
        ])
        .await?;
        info!(job = %uri, %operation, "created job");
        Ok(job)
    }

    pub async fn create_task(
        &self,
        job: &Job,
        index: usize,
        operation: &str,
        status: Status,
        parents: &[String],
    ) -> Result<Task, LedgerError> {
        let now = self.now();
        let task = Task {
            id: TaskId::new(self.next_id()),
            job: job.uri(),
            operation: operation.to_string(),
            status,
            index: index.to_string(),
            parents: parents.to_vec(),
            created: now,
            modified: now,
        };
        let uri = task.uri();
        let mut triples = vec![
            stmt(&uri, vocab::RDF_TYPE, Term::uri(types::TASK)),
            stmt(&uri, vocab::MU_UUID, Term::literal(task.id.as_str())),
            stmt(&uri, vocab::ADMS_STATUS, Term::uri(status.uri())),
            stmt(&uri, vocab::DCT_CREATED, Term::date_time(now)),
            stmt(&uri, vocab::DCT_MODIFIED, Term::date_time(now)),
            stmt(&uri, vocab::TASK_OPERATION, Term::uri(operation)),
            stmt(&uri, vocab::TASK_INDEX, Term::literal(task.index.clone())),
            stmt(&uri, vocab::DCT_IS_PART_OF, Term::uri(task.job.clone())),
        ];
        triples.extend(parents.iter().map(|p| stmt(&uri, vocab::COGS_DEPENDS_ON, Term::uri(p))));
        self.insert(&triples).await?;
        Ok(task)
    }

    /// Task for one delta file, with a data container recording what it
    /// ingested. Chained to `parent` when given.
    pub async fn create_delta_sync_task(
        &self,
        job: &Job,
        index: usize,
        status: Status,
        file: &DeltaFile,
        parent: Option<&Task>,
    ) -> Result<Task, LedgerError> {
        let parents: Vec<String> = parent.map(Task::uri).into_iter().collect();
        let task = self.create_task(job, index, operations::DELTA_SYNC_TASK, status, &parents).await?;
        let container = ContainerId::new(self.next_id());
        let c = container.uri();
        let t = task.uri();
        self.insert(&[
            stmt(&c, vocab::RDF_TYPE, Term::uri(types::DATA_CONTAINER)),
            stmt(&c, vocab::DCT_SUBJECT, Term::uri(vocab::DELTA_FILE_INFO_CONCEPT)),
            stmt(&c, vocab::MU_UUID, Term::literal(container.as_str())),
            stmt(&c, vocab::EXT_DELTAFILE_TIMESTAMP, Term::date_time(file.created)),
            stmt(&c, vocab::EXT_DELTAFILE_ID, Term::literal(file.id.clone())),
            stmt(&c, vocab::EXT_DELTAFILE_NAME, Term::literal(file.name.clone())),
            stmt(&t, vocab::TASK_RESULTS_CONTAINER, Term::uri(c.clone())),
            stmt(&t, vocab::TASK_INPUT_CONTAINER, Term::uri(c.clone())),
        ])
        .await?;
        Ok(task)
    }

    /// Compare-and-set the status of a Job or Task.
    ///
    /// Returns `false` without writing when the status is already `status`.
    /// Leaving a terminal status is refused.
    pub async fn update_status(&self, uri: &str, status: Status) -> Result<bool, LedgerError> {
        let r = describe(self.store(), &self.config.jobs_graph, uri).await?;
        let current = status_of(&r)?;
        if current == status {
            return Ok(false);
        }
        if !current.can_transition_to(status) {
            return Err(LedgerError::TerminalStatus {
                uri: uri.to_string(),
                current,
                requested: status,
            });
        }
        let mut stale = r.triples_for(vocab::ADMS_STATUS);
        stale.extend(r.triples_for(vocab::DCT_MODIFIED));
        self.delete(&stale).await?;
        self.insert(&[
            stmt(uri, vocab::ADMS_STATUS, Term::uri(status.uri())),
            stmt(uri, vocab::DCT_MODIFIED, Term::date_time(self.now())),
        ])
        .await?;
        info!(%uri, from = %current, to = %status, "status updated");
        Ok(true)
    }

    pub async fn load_job(&self, uri: &str) -> Result<Option<Job>, LedgerError> {
        let r = describe(self.store(), &self.config.jobs_graph, uri).await?;
        if !r.has_type(types::JOB) {
            return Ok(None);
        }
        let tasks = subjects(
            self.store(),
            &Pattern::in_graph(&self.config.jobs_graph)
                .predicate(vocab::DCT_IS_PART_OF)
                .object(Term::uri(uri)),
        )
        .await?;
        Ok(Some(Job {
            id: JobId::new(uuid_of(&r)?),
            operation: r.first_uri(vocab::TASK_OPERATION).unwrap_or_default().to_string(),
            creator: r.first_uri(vocab::DCT_CREATOR).unwrap_or_default().to_string(),
            status: status_of(&r)?,
            created: date_of(&r, vocab::DCT_CREATED)?,
            modified: date_of(&r, vocab::DCT_MODIFIED)?,
            tasks,
        }))
    }

    pub async fn load_task(&self, uri: &str) -> Result<Option<Task>, LedgerError> {
        let r = describe(self.store(), &self.config.jobs_graph, uri).await?;
        if !r.has_type(types::TASK) {
            return Ok(None);
        }
        Ok(Some(Task {
            id: TaskId::new(uuid_of(&r)?),
            job: r.first_uri(vocab::DCT_IS_PART_OF).unwrap_or_default().to_string(),
            operation: r.first_uri(vocab::TASK_OPERATION).unwrap_or_default().to_string(),
            status: status_of(&r)?,
            index: value_of(&r, vocab::TASK_INDEX),
            parents: r.uris(vocab::COGS_DEPENDS_ON),
            created: date_of(&r, vocab::DCT_CREATED)?,
            modified: date_of(&r, vocab::DCT_MODIFIED)?,
        }))
    }

    /// Jobs for `operation` whose status is in `status_in` (any when empty)
    /// and not in `status_not_in`, oldest first.
    pub async fn get_jobs(
        &self,
        operation: &str,
        status_in: &[Status],
        status_not_in: &[Status],
    ) -> Result<Vec<Job>, LedgerError> {
        self.find_jobs(JobQuery { operation, creator: None, status_in, status_not_in, latest: false })
            .await
    }

    /// Most recently created Job for `operation` by `creator`.
    pub async fn get_latest_job_for_operation(
        &self,
        operation: &str,
        creator: &str,
    ) -> Result<Option<Job>, LedgerError> {
        let query = JobQuery {
            operation,
            creator: Some(creator),
            status_in: &[],
            status_not_in: &[],
            latest: true,
        };
        Ok(self.find_jobs(query).await?.pop())
    }

    /// Two round trips whatever the ledger size: one for the Jobs, one for
    /// their Tasks.
    async fn find_jobs(&self, q: JobQuery<'_>) -> Result<Vec<Job>, LedgerError> {
        let graph = &self.config.jobs_graph;
        let job = || Node::var("job");
        let mut select = Select::in_graph(graph)
            .vars(&["job", "uuid", "creator", "status", "created", "modified"])
            .clause(job(), vocab::RDF_TYPE, Node::uri(types::JOB))
            .clause(job(), vocab::TASK_OPERATION, Node::uri(q.operation))
            .clause(job(), vocab::MU_UUID, Node::var("uuid"))
            .clause(job(), vocab::DCT_CREATOR, Node::var("creator"))
            .clause(job(), vocab::ADMS_STATUS, Node::var("status"))
            .clause(job(), vocab::DCT_CREATED, Node::var("created"))
            .clause(job(), vocab::DCT_MODIFIED, Node::var("modified"));
        if let Some(creator) = q.creator {
            select = select.one_of("creator", [Term::uri(creator)]);
        }
        if !q.status_in.is_empty() {
            select = select.one_of("status", q.status_in.iter().map(|s| Term::uri(s.uri())));
        }
        if !q.status_not_in.is_empty() {
            select = select.none_of("status", q.status_not_in.iter().map(|s| Term::uri(s.uri())));
        }
        select = if q.latest {
            select.order_by("created", Order::Desc).limit(1)
        } else {
            select.order_by("created", Order::Asc)
        };

        let mut jobs: Vec<Job> = Vec::new();
        for row in self.store().query(&select).await? {
            let uri = bound(&row, "job")?.value().to_string();
            if jobs.iter().any(|j| j.uri() == uri) {
                continue;
            }
            let malformed =
                |reason: &str| LedgerError::Malformed { uri: uri.clone(), reason: reason.to_string() };
            let date = |var: &str| -> Result<DateTime<Utc>, LedgerError> {
                bound(&row, var)?.as_date_time().ok_or_else(|| malformed(&format!("invalid ?{var}")))
            };
            jobs.push(Job {
                id: JobId::new(bound(&row, "uuid")?.value()),
                operation: q.operation.to_string(),
                creator: bound(&row, "creator")?.value().to_string(),
                status: bound(&row, "status")?
                    .as_uri()
                    .and_then(Status::from_uri)
                    .ok_or_else(|| malformed("unknown status"))?,
                created: date("created")?,
                modified: date("modified")?,
                tasks: Vec::new(),
            });
        }
        if jobs.is_empty() {
            return Ok(jobs);
        }

        let tasks = Select::in_graph(graph)
            .vars(&["task", "job"])
            .clause(Node::var("task"), vocab::DCT_IS_PART_OF, Node::var("job"))
            .one_of("job", jobs.iter().map(|j| Term::uri(j.uri())))
            .order_by("task", Order::Asc);
        for row in self.store().query(&tasks).await? {
            let owner = bound(&row, "job")?.value();
            if let Some(job) = jobs.iter_mut().find(|j| j.uri() == owner) {
                job.tasks.push(bound(&row, "task")?.value().to_string());
            }
        }
        Ok(jobs)
    }

    /// Delete a Job with all of its Tasks and their containers.
    pub async fn cleanup_job(&self, job: &Job) -> Result<(), LedgerError> {
        let graph = &self.config.jobs_graph;
        let mut owners = job.tasks.clone();
        owners.push(job.uri());
        let mut doomed = Vec::new();
        for uri in &owners {
            let owner = describe(self.store(), graph, uri).await?;
            let mut linked = owner.uris(vocab::TASK_RESULTS_CONTAINER);
            linked.extend(owner.uris(vocab::TASK_ERROR));
            for linked_uri in linked {
                doomed.extend(describe(self.store(), graph, &linked_uri).await?.triples());
            }
            doomed.extend(owner.triples());
        }
        doomed.sort();
        doomed.dedup();
        self.delete(&doomed).await?;
        info!(job = %job.uri(), tasks = job.tasks.len(), "cleaned up job");
        Ok(())
    }

    /// Startup sweep: a Job still busy for `operation` cannot have survived
    /// the restart, so it and its unfinished Tasks are marked failed.
    pub async fn fail_busy_jobs(&self, operation: &str) -> Result<Vec<Job>, LedgerError> {
        let busy = self.get_jobs(operation, &[Status::Busy], &[]).await?;
        for job in &busy {
            warn!(job = %job.uri(), %operation, "failing job left busy by a previous run");
            for task_uri in &job.tasks {
                if let Some(task) = self.load_task(task_uri).await? {
                    if !task.status.is_terminal() {
                        self.update_status(task_uri, Status::Failed).await?;
                    }
                }
            }
            self.update_status(&job.uri(), Status::Failed).await?;
        }
        Ok(busy)
    }

    /// Timestamp of the newest delta file recorded by a successful
    /// delta-sync or initial-sync Task, under Jobs of `creator` whose
    /// operation is one of `job_operations`. One round trip.
    pub async fn latest_delta_timestamp(
        &self,
        creator: &str,
        job_operations: &[&str],
    ) -> Result<Option<DeltaFileInfo>, LedgerError> {
        let task = || Node::var("task");
        let container = || Node::var("container");
        let select = Select::in_graph(&self.config.jobs_graph)
            .vars(&["container", "timestamp", "id", "name"])
            .clause(task(), vocab::ADMS_STATUS, Node::uri(Status::Success.uri()))
            .clause(task(), vocab::TASK_OPERATION, Node::var("taskOperation"))
            .clause(task(), vocab::DCT_IS_PART_OF, Node::var("job"))
            .clause(Node::var("job"), vocab::DCT_CREATOR, Node::uri(creator))
            .clause(Node::var("job"), vocab::TASK_OPERATION, Node::var("jobOperation"))
            .clause(task(), vocab::TASK_RESULTS_CONTAINER, container())
            .clause(container(), vocab::EXT_DELTAFILE_TIMESTAMP, Node::var("timestamp"))
            .clause(container(), vocab::EXT_DELTAFILE_ID, Node::var("id"))
            .clause(container(), vocab::EXT_DELTAFILE_NAME, Node::var("name"))
            .one_of(
                "taskOperation",
                [Term::uri(operations::DELTA_SYNC_TASK), Term::uri(operations::INITIAL_SYNC_TASK)],
            )
            .one_of("jobOperation", job_operations.iter().map(|op| Term::uri(*op)))
            .order_by("timestamp", Order::Desc)
            .limit(1);

        let Some(row) = self.store().query(&select).await?.into_iter().next() else {
            return Ok(None);
        };
        let timestamp =
            bound(&row, "timestamp")?.as_date_time().ok_or_else(|| LedgerError::Malformed {
                uri: bound(&row, "container").map(|c| c.value().to_string()).unwrap_or_default(),
                reason: format!("invalid {}", vocab::EXT_DELTAFILE_TIMESTAMP),
            })?;
        Ok(Some(DeltaFileInfo {
            timestamp,
            id: bound(&row, "id")?.value().to_string(),
            name: bound(&row, "name")?.value().to_string(),
        }))
    }
}

struct JobQuery<'a> {
    operation: &'a str,
    creator: Option<&'a str>,
    status_in: &'a [Status],
    status_not_in: &'a [Status],
    latest: bool,
}

fn bound<'r>(row: &'r Row, var: &str) -> Result<&'r Term, LedgerError> {
    row.get(var).ok_or_else(|| LedgerError::Malformed {
        uri: row.values().next().map(|t| t.value().to_string()).unwrap_or_default(),
        reason: format!("query result without ?{var}"),
    })
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
