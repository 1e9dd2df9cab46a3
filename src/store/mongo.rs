use axum::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson, Document},
    Client, Collection, Database,
};
use serde_json::Value;

use super::{stamp_timestamps, DocumentStore, StoreError, StoreResult};

/// MongoDB-backed store. Collections map one-to-one onto collection names.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect and ping once so that a dead server is caught at startup
    /// rather than on the first request.
    pub async fn connect(uri: &str, db_name: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await.map_err(backend)?;
        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 }).await.map_err(backend)?;
        Ok(Self { db })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

fn backend(e: mongodb::error::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn document_to_json(mut document: Document) -> Value {
    let id = document.remove("_id").map(|id| id_to_string(&id));
    let mut value = Bson::Document(document).into_relaxed_extjson();
    if let (Some(id), Some(obj)) = (id, value.as_object_mut()) {
        obj.insert("_id".into(), Value::String(id));
    }
    value
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, mut document: Value) -> StoreResult<String> {
        stamp_timestamps(&mut document);
        let document = bson::to_document(&document)
            .map_err(|e| StoreError::Backend(format!("document is not an object: {e}")))?;
        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(backend)?;
        Ok(id_to_string(&result.inserted_id))
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let cursor = self
            .collection(collection)
            .find(doc! {})
            .await
            .map_err(backend)?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(backend)?;
        Ok(documents.into_iter().map(document_to_json).collect())
    }

    async fn count_all(&self, collection: &str) -> StoreResult<u64> {
        self.collection(collection)
            .count_documents(doc! {})
            .await
            .map_err(backend)
    }

    async fn list_collection_names(&self) -> StoreResult<Vec<String>> {
        self.db.list_collection_names().await.map_err(backend)
    }

    fn database_name(&self) -> Option<&str> {
        Some(self.db.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn object_ids_become_hex_strings() {
        let oid = ObjectId::new();
        let json = document_to_json(doc! { "_id": oid, "name": "Starter", "price_cents": 1900_i64 });
        assert_eq!(json["_id"], oid.to_hex());
        assert_eq!(json["name"], "Starter");
        assert_eq!(json["price_cents"], 1900);
    }

    #[test]
    fn documents_without_id_are_left_alone() {
        let json = document_to_json(doc! { "features": ["a", "b"] });
        assert!(json.get("_id").is_none());
        assert_eq!(json["features"][1], "b");
    }
}
