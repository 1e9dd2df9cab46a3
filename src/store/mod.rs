//! Document store adapter.
//!
//! Handlers only ever see [`DocumentStore`]; which backend sits behind it is
//! decided once at startup by [`connect`].

use std::sync::Arc;

use axum::async_trait;
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::config::StoreConfig;

#[cfg(test)]
pub mod memory;
mod mongo;

pub use mongo::MongoStore;

pub const PLAN: &str = "plan";
pub const STRIPE_EVENT: &str = "stripeevent";
pub const GOOGLE_CONNECTION: &str = "googleconnection";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database not configured")]
    Unavailable,

    #[error("database error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Schemaless persistence addressed by collection name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document and return its generated id.
    async fn insert(&self, collection: &str, document: Value) -> StoreResult<String>;
    /// Every document in the collection, `_id` rendered as a string.
    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Value>>;
    async fn count_all(&self, collection: &str) -> StoreResult<u64>;
    async fn list_collection_names(&self) -> StoreResult<Vec<String>>;
    /// Name of the backing database, `None` when nothing is connected.
    fn database_name(&self) -> Option<&str>;
}

/// Stand-in used when no connection could be made at startup.
#[derive(Debug, Clone, Default)]
pub struct DisabledStore;

#[async_trait]
impl DocumentStore for DisabledStore {
    async fn insert(&self, _collection: &str, _document: Value) -> StoreResult<String> {
        Err(StoreError::Unavailable)
    }

    async fn find_all(&self, _collection: &str) -> StoreResult<Vec<Value>> {
        Err(StoreError::Unavailable)
    }

    async fn count_all(&self, _collection: &str) -> StoreResult<u64> {
        Err(StoreError::Unavailable)
    }

    async fn list_collection_names(&self) -> StoreResult<Vec<String>> {
        Err(StoreError::Unavailable)
    }

    fn database_name(&self) -> Option<&str> {
        None
    }
}

/// Connect to the configured store. Never fails: a missing setting or an
/// unreachable server leaves the process running on [`DisabledStore`].
pub async fn connect(config: &StoreConfig) -> Arc<dyn DocumentStore> {
    let (Some(url), Some(database)) = (config.url.as_deref(), config.database.as_deref()) else {
        tracing::warn!("DATABASE_URL or DATABASE_NAME not set; document store disabled");
        return Arc::new(DisabledStore);
    };

    match MongoStore::connect(url, database).await {
        Ok(store) => {
            tracing::info!(database, "document store connected");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(error = %e, "document store unreachable; continuing without it");
            Arc::new(DisabledStore)
        }
    }
}

/// Add `created_at`/`updated_at` to an object document unless already present.
pub fn stamp_timestamps(document: &mut Value) {
    let Some(obj) = document.as_object_mut() else {
        return;
    };
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    for key in ["created_at", "updated_at"] {
        obj.entry(key).or_insert_with(|| Value::String(now.clone()));
    }
}

/// Writes whose failure must not fail the request that issued them
/// (audit records, token snapshots, seeding). Failures are logged and dropped.
#[derive(Clone)]
pub struct BestEffortSink {
    store: Arc<dyn DocumentStore>,
}

impl BestEffortSink {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, collection: &str, document: Value) -> Option<String> {
        match self.store.insert(collection, document).await {
            Ok(id) => {
                tracing::debug!(collection, %id, "best-effort write stored");
                Some(id)
            }
            Err(e) => {
                tracing::warn!(collection, error = %e, "best-effort write dropped");
                None
            }
        }
    }
}
