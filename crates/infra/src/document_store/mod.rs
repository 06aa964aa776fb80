//! Document store seam.
//!
//! A document store holds schema-flexible JSON documents grouped into named
//! collections. Documents are addressed by their application-level `id` field,
//! never by the backend's own identity. When several documents share an `id`,
//! every single-document operation targets the first one in storage order.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;

/// A stored document (always a JSON object in practice).
pub type Document = serde_json::Value;

/// Named collections known to the service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Employees,
    Departments,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Employees, Collection::Departments];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Employees => "employees",
            Collection::Departments => "departments",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Backend failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentStoreError {
    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document {id} in {collection} is not an object")]
    NotAnObject { collection: Collection, id: i64 },

    #[error("field {field:?} of document {id} in {collection} must be an array")]
    NotAnArray {
        collection: Collection,
        id: i64,
        field: String,
    },
}

/// Single-document operations over JSON collections.
///
/// Write operations report how many documents they matched instead of failing
/// on zero; callers decide whether that is an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Round-trip to the backend to prove it is reachable.
    async fn ping(&self) -> Result<(), DocumentStoreError>;

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<(), DocumentStoreError>;

    async fn find_one(&self, collection: Collection, id: i64) -> Result<Option<Document>, DocumentStoreError>;

    /// All documents of a collection, in storage order.
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, DocumentStoreError>;

    /// Replace the whole first matching document. Returns the matched count (0 or 1).
    async fn replace_one(
        &self,
        collection: Collection,
        id: i64,
        doc: Document,
    ) -> Result<u64, DocumentStoreError>;

    /// Remove the first matching document. Returns the deleted count (0 or 1).
    async fn delete_one(&self, collection: Collection, id: i64) -> Result<u64, DocumentStoreError>;

    /// Append `value` to the array `field` of the first matching document.
    ///
    /// A missing field is created as a one-element array. Returns the matched
    /// count (0 or 1).
    async fn push(
        &self,
        collection: Collection,
        id: i64,
        field: &str,
        value: Document,
    ) -> Result<u64, DocumentStoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn ping(&self) -> Result<(), DocumentStoreError> {
        (**self).ping().await
    }

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<(), DocumentStoreError> {
        (**self).insert_one(collection, doc).await
    }

    async fn find_one(&self, collection: Collection, id: i64) -> Result<Option<Document>, DocumentStoreError> {
        (**self).find_one(collection, id).await
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, DocumentStoreError> {
        (**self).find_all(collection).await
    }

    async fn replace_one(
        &self,
        collection: Collection,
        id: i64,
        doc: Document,
    ) -> Result<u64, DocumentStoreError> {
        (**self).replace_one(collection, id, doc).await
    }

    async fn delete_one(&self, collection: Collection, id: i64) -> Result<u64, DocumentStoreError> {
        (**self).delete_one(collection, id).await
    }

    async fn push(
        &self,
        collection: Collection,
        id: i64,
        field: &str,
        value: Document,
    ) -> Result<u64, DocumentStoreError> {
        (**self).push(collection, id, field, value).await
    }
}

/// Application-level id of a document, if it carries an integer `id` field.
pub(crate) fn document_id(doc: &Document) -> Option<i64> {
    doc.get("id").and_then(serde_json::Value::as_i64)
}

/// Append `value` to `doc[field]`, shared by every backend so `$push` semantics agree.
pub(crate) fn push_value(
    doc: &mut Document,
    collection: Collection,
    id: i64,
    field: &str,
    value: Document,
) -> Result<(), DocumentStoreError> {
    let obj = doc
        .as_object_mut()
        .ok_or(DocumentStoreError::NotAnObject { collection, id })?;

    match obj
        .entry(field)
        .or_insert_with(|| serde_json::Value::Array(Vec::new()))
    {
        serde_json::Value::Array(items) => {
            items.push(value);
            Ok(())
        }
        _ => Err(DocumentStoreError::NotAnArray {
            collection,
            id,
            field: field.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_appends_and_keeps_duplicates() {
        let mut doc = json!({"id": 1, "employees": [5]});
        push_value(&mut doc, Collection::Departments, 1, "employees", json!(5)).unwrap();
        push_value(&mut doc, Collection::Departments, 1, "employees", json!(7)).unwrap();
        assert_eq!(doc["employees"], json!([5, 5, 7]));
    }

    #[test]
    fn push_creates_missing_field() {
        let mut doc = json!({"id": 1});
        push_value(&mut doc, Collection::Departments, 1, "employees", json!(9)).unwrap();
        assert_eq!(doc["employees"], json!([9]));
    }

    #[test]
    fn push_onto_scalar_or_null_fails() {
        let mut doc = json!({"id": 1, "employees": null});
        let err = push_value(&mut doc, Collection::Departments, 1, "employees", json!(2)).unwrap_err();
        assert!(matches!(err, DocumentStoreError::NotAnArray { .. }));

        let mut doc = json!([1, 2]);
        let err = push_value(&mut doc, Collection::Departments, 1, "employees", json!(2)).unwrap_err();
        assert_eq!(err, DocumentStoreError::NotAnObject { collection: Collection::Departments, id: 1 });
    }

    #[test]
    fn document_id_requires_integer() {
        assert_eq!(document_id(&json!({"id": 3})), Some(3));
        assert_eq!(document_id(&json!({"id": "3"})), None);
        assert_eq!(document_id(&json!({"name": "x"})), None);
    }
}
