use std::collections::BTreeMap;

use axum::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{stamp_timestamps, DocumentStore, StoreError, StoreResult};

/// In-process store for tests; insertion order is kept per collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, Vec<Value>>>,
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut document: Value) -> StoreResult<String> {
        let id = ObjectId::new().to_hex();
        stamp_timestamps(&mut document);
        let obj = document
            .as_object_mut()
            .ok_or_else(|| StoreError::Backend("document is not an object".into()))?;
        obj.insert("_id".into(), Value::String(id.clone()));
        self.collections
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Value>> {
        Ok(self
            .collections
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_all(&self, collection: &str) -> StoreResult<u64> {
        Ok(self
            .collections
            .lock()
            .await
            .get(collection)
            .map_or(0, |docs| docs.len() as u64))
    }

    async fn list_collection_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.collections.lock().await.keys().cloned().collect())
    }

    fn database_name(&self) -> Option<&str> {
        Some("memory")
    }
}
