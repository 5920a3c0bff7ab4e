use async_trait::async_trait;
use azure_core::{base64, StatusCode};
use azure_data_cosmos::prelude::{AuthorizationToken, CollectionClient, CosmosClient, Query};
use chrono::{DateTime, SecondsFormat, Utc};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};

use crate::store::{DeleteOutcome, StoreError, TodoRef, TodoStore};

/// Todo store backed by a Cosmos DB collection.
pub struct CosmosStore {
    collection: CollectionClient,
}

impl CosmosStore {
    /// Build a client for the configured account, database and collection.
    ///
    /// The SDK only checks the primary key when it signs a request; decoding
    /// it here surfaces a malformed credential before any store access.
    pub fn new(
        account: &str,
        key: &str,
        database: &str,
        collection: &str,
    ) -> Result<Self, StoreError> {
        base64::decode(key).map_err(StoreError::Credentials)?;

        let token = AuthorizationToken::primary_key(key).map_err(StoreError::Credentials)?;
        let collection = CosmosClient::new(account, token)
            .database_client(database.to_owned())
            .collection_client(collection.to_owned());

        Ok(Self { collection })
    }
}

/// Selection statement for the cleanup pass: completed todos created strictly
/// before the cutoff, projected down to id + partition key.
///
/// `created_at` is stored as RFC 3339 with a `Z` suffix; the store compares
/// the strings lexicographically, so the cutoff is rendered the same way.
fn completed_before_statement(cutoff: DateTime<Utc>) -> String {
    format!(
        "SELECT c.id, c.created_by FROM c WHERE c.done = true AND c.created_at < '{}'",
        cutoff.to_rfc3339_opts(SecondsFormat::Micros, true)
    )
}

#[async_trait]
impl TodoStore for CosmosStore {
    #[tracing::instrument(name = "Query stale completed todos from db", skip(self))]
    fn completed_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> BoxStream<'_, Result<TodoRef, StoreError>> {
        let query = Query::new(completed_before_statement(cutoff));

        self.collection
            .query_documents(query)
            .query_cross_partition(true)
            .into_stream::<TodoRef>()
            .map_err(StoreError::from)
            .map_ok(|response| {
                futures::stream::iter(response.results.into_iter().map(|row| Ok(row.0)))
            })
            .try_flatten()
            .boxed()
    }

    #[tracing::instrument(name = "Delete todo from db by id and partition key", skip(self, todo))]
    async fn delete(&self, todo: &TodoRef) -> Result<DeleteOutcome, StoreError> {
        let deleted = self
            .collection
            .document_client(todo.id.clone(), &todo.created_by)?
            .delete_document()
            .await;

        match deleted {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(err) if is_not_found(&err) => Ok(DeleteOutcome::NotFound),
            Err(err) => Err(err.into()),
        }
    }
}

fn is_not_found(err: &azure_core::error::Error) -> bool {
    err.as_http_error()
        .is_some_and(|http| http.status() == StatusCode::NotFound)
}
