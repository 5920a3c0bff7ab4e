use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde_derive::Deserialize;
use thiserror::Error;

/// The two fields needed to address a todo document for deletion: its id and
/// its partition key, the user that created it.
///
/// Selection queries project documents down to exactly these fields, so this
/// is also the row type they return.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodoRef {
    pub id: String,
    pub created_by: String,
}

/// Outcome of a targeted delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The document was already gone when the delete reached the store.
    NotFound,
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// The configured primary key is not valid base64.
    #[error("invalid store credentials: {0}")]
    Credentials(#[source] azure_core::error::Error),

    /// A query or delete request against the store failed.
    #[error("store request failed: {0}")]
    Request(#[from] azure_core::error::Error),
}

/// What the janitor needs from the todo store: a cross-partition view of
/// stale completed todos, and targeted deletes.
#[async_trait]
pub trait TodoStore {
    /// Todos marked done that were created strictly before `cutoff`, across
    /// every partition. The stream is lazy; pagination stays behind it.
    fn completed_before(&self, cutoff: DateTime<Utc>) -> BoxStream<'_, Result<TodoRef, StoreError>>;

    /// Delete one todo from its owner's partition.
    async fn delete(&self, todo: &TodoRef) -> Result<DeleteOutcome, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_ref_deserializes_from_projected_row() {
        let row = serde_json::json!({
            "id": "2f9a6d1e-7c3b-4f56-9f3e-0d8c1a2b3c4d",
            "created_by": "user-7",
        });

        let todo: TodoRef = serde_json::from_value(row).unwrap();

        assert_eq!(todo.id, "2f9a6d1e-7c3b-4f56-9f3e-0d8c1a2b3c4d");
        assert_eq!(todo.created_by, "user-7");
    }

    #[test]
    fn todo_ref_ignores_store_system_fields() {
        // Query results carry store bookkeeping fields alongside the
        // projection; they must not break deserialization.
        let row = serde_json::json!({
            "id": "t-1",
            "created_by": "user-1",
            "_rid": "fAkERiD=",
            "_ts": 1_700_000_000,
        });

        let todo: TodoRef = serde_json::from_value(row).unwrap();

        assert_eq!(todo.id, "t-1");
    }
}
