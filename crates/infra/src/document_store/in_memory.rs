use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{Collection, Document, DocumentStore, DocumentStoreError, document_id, push_value};

/// In-memory document store.
///
/// Intended for tests/dev. Each collection is a `Vec` so insertion order is
/// storage order. Lookups are linear scans.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub fn len(&self, collection: Collection) -> Result<usize, DocumentStoreError> {
        let map = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(&collection).map_or(0, Vec::len))
    }

    fn poisoned() -> DocumentStoreError {
        DocumentStoreError::Unavailable("in-memory store lock poisoned".to_string())
    }

    fn position(docs: &[Document], id: i64) -> Option<usize> {
        docs.iter().position(|d| document_id(d) == Some(id))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn ping(&self) -> Result<(), DocumentStoreError> {
        self.collections.read().map(|_| ()).map_err(|_| Self::poisoned())
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<(), DocumentStoreError> {
        let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
        map.entry(collection).or_default().push(doc);
        Ok(())
    }

    async fn find_one(&self, collection: Collection, id: i64) -> Result<Option<Document>, DocumentStoreError> {
        let map = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(map
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| document_id(d) == Some(id)))
            .cloned())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, DocumentStoreError> {
        let map = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(&collection).cloned().unwrap_or_default())
    }

    async fn replace_one(
        &self,
        collection: Collection,
        id: i64,
        doc: Document,
    ) -> Result<u64, DocumentStoreError> {
        let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
        let Some(docs) = map.get_mut(&collection) else {
            return Ok(0);
        };
        match Self::position(docs, id) {
            Some(idx) => {
                docs[idx] = doc;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, collection: Collection, id: i64) -> Result<u64, DocumentStoreError> {
        let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
        let Some(docs) = map.get_mut(&collection) else {
            return Ok(0);
        };
        match Self::position(docs, id) {
            Some(idx) => {
                docs.remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn push(
        &self,
        collection: Collection,
        id: i64,
        field: &str,
        value: Document,
    ) -> Result<u64, DocumentStoreError> {
        let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
        let Some(docs) = map.get_mut(&collection) else {
            return Ok(0);
        };
        match Self::position(docs, id) {
            Some(idx) => {
                push_value(&mut docs[idx], collection, id, field, value)?;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn find_returns_first_match_in_insertion_order() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_one(Collection::Employees, json!({"id": 1, "name": "first"}))
            .await
            .unwrap();
        store
            .insert_one(Collection::Employees, json!({"id": 1, "name": "second"}))
            .await
            .unwrap();

        let found = store.find_one(Collection::Employees, 1).await.unwrap().unwrap();
        assert_eq!(found["name"], "first");
        assert_eq!(store.len(Collection::Employees).unwrap(), 2);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_one(Collection::Employees, json!({"id": 1}))
            .await
            .unwrap();

        assert!(store.find_one(Collection::Departments, 1).await.unwrap().is_none());
        assert!(store.find_all(Collection::Departments).await.unwrap().is_empty());
        assert_eq!(store.delete_one(Collection::Departments, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn writes_report_matched_counts() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_one(Collection::Departments, json!({"id": 2, "employees": []}))
            .await
            .unwrap();

        assert_eq!(
            store
                .replace_one(Collection::Departments, 9, json!({"id": 9}))
                .await
                .unwrap(),
            0
        );
        assert_eq!(store.len(Collection::Departments).unwrap(), 1);

        assert_eq!(
            store
                .push(Collection::Departments, 2, "employees", json!(4))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .push(Collection::Departments, 3, "employees", json!(4))
                .await
                .unwrap(),
            0
        );

        let doc = store.find_one(Collection::Departments, 2).await.unwrap().unwrap();
        assert_eq!(doc["employees"], json!([4]));

        assert_eq!(store.delete_one(Collection::Departments, 2).await.unwrap(), 1);
        assert_eq!(store.delete_one(Collection::Departments, 2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_removes_only_first_duplicate() {
        let store = InMemoryDocumentStore::new();
        for name in ["a", "b"] {
            store
                .insert_one(Collection::Employees, json!({"id": 5, "name": name}))
                .await
                .unwrap();
        }

        assert_eq!(store.delete_one(Collection::Employees, 5).await.unwrap(), 1);
        let left = store.find_all(Collection::Employees).await.unwrap();
        assert_eq!(left, vec![json!({"id": 5, "name": "b"})]);
    }

    #[tokio::test]
    async fn poisoned_lock_is_unavailable_everywhere() {
        let store = std::sync::Arc::new(InMemoryDocumentStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.collections.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(
            store.len(Collection::Employees),
            Err(DocumentStoreError::Unavailable(_))
        ));
        assert!(store.ping().await.is_err());
        assert!(store.find_all(Collection::Employees).await.is_err());
    }
}
