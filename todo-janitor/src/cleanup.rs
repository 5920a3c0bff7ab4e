use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use futures::StreamExt;
use thiserror::Error;

use todo_common::store::{DeleteOutcome, StoreError, TodoRef, TodoStore};

use crate::config::OnDeleteError;

/// Completed todos are retained this long before a cleanup pass removes them.
const RETENTION_DAYS: i64 = 7;

pub struct Cleaner<S> {
    store: S,
    on_delete_error: OnDeleteError,
}

/// What one cleanup pass did: the todos it deleted, plus the matches it could
/// not delete (already gone, or failed under the continue policy).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub deleted: Vec<TodoRef>,
    pub missing: usize,
    pub failed: usize,
}

impl DeletionReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("stale todo query failed: {0}")]
    Query(#[source] StoreError),

    #[error(
        "failed to delete todo {id} in partition {created_by} after {deleted_so_far} deletions: {source}"
    )]
    Delete {
        id: String,
        created_by: String,
        deleted_so_far: usize,
        #[source]
        source: StoreError,
    },
}

impl<S: TodoStore> Cleaner<S> {
    pub fn new(store: S, on_delete_error: OnDeleteError) -> Self {
        Self {
            store,
            on_delete_error,
        }
    }

    /// Loop entry point: run one pass against the current wall clock and
    /// surface the outcome through logs and metrics.
    pub async fn cleanup(&self) {
        let started = Instant::now();

        match self.run(Utc::now()).await {
            Ok(_) => {
                metrics::counter!("todo_cleanup_success").increment(1);
            }
            Err(e) => {
                metrics::counter!("todo_cleanup_failure").increment(1);
                tracing::error!("cleanup run failed, {}", e);
            }
        }

        metrics::histogram!("todo_cleanup_duration_seconds")
            .record(started.elapsed().as_secs_f64());
    }

    /// One cleanup pass: delete every todo marked done that was created more
    /// than [`RETENTION_DAYS`] before `now`.
    ///
    /// The selection query and the deletes are separate steps with nothing
    /// spanning them; a record removed by another actor in between comes back
    /// as `NotFound` and is tallied rather than treated as a failure.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<DeletionReport, CleanupError> {
        let cutoff = now - Duration::days(RETENTION_DAYS);
        tracing::info!(%now, %cutoff, "clearing completed todos older than {} days", RETENTION_DAYS);

        let mut stale = self.store.completed_before(cutoff);
        let mut report = DeletionReport::default();

        while let Some(todo) = stale.next().await {
            let todo = todo.map_err(CleanupError::Query)?;

            match self.store.delete(&todo).await {
                Ok(DeleteOutcome::Deleted) => {
                    tracing::info!(id = %todo.id, created_by = %todo.created_by, "deleted stale todo");
                    // per deletion rather than per run; an aborted run still
                    // reports the removals it completed
                    metrics::counter!("todo_cleanup_deleted_total").increment(1);
                    report.deleted.push(todo);
                }
                Ok(DeleteOutcome::NotFound) => {
                    tracing::warn!(id = %todo.id, created_by = %todo.created_by, "stale todo was already gone");
                    report.missing += 1;
                }
                Err(source) => match self.on_delete_error {
                    OnDeleteError::Abort => {
                        return Err(CleanupError::Delete {
                            id: todo.id,
                            created_by: todo.created_by,
                            deleted_so_far: report.deleted_count(),
                            source,
                        });
                    }
                    OnDeleteError::Continue => {
                        tracing::error!(
                            id = %todo.id,
                            created_by = %todo.created_by,
                            "failed to delete stale todo, {}", source
                        );
                        report.failed += 1;
                    }
                },
            }
        }

        tracing::info!(
            deleted = report.deleted_count(),
            missing = report.missing,
            failed = report.failed,
            "finished clearing completed todos"
        );

        Ok(report)
    }
}
