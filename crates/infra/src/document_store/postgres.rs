//! Postgres-backed document store.
//!
//! Each collection is a table holding one JSONB document per row:
//!
//! ```sql
//! CREATE TABLE employees (seq BIGSERIAL PRIMARY KEY, doc JSONB NOT NULL);
//! ```
//!
//! `seq` is the backend's own identity and defines storage order. Documents are
//! filtered on `doc->'id'`, which is indexed but not unique.
//!
//! ## Error Mapping
//!
//! | SQLx Error | DocumentStoreError |
//! |------------|--------------------|
//! | Database | `Database` (message carries the operation) |
//! | PoolClosed / PoolTimedOut | `Unavailable` |
//! | Other | `Database` |

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use tracing::instrument;

use super::{Collection, Document, DocumentStore, DocumentStoreError, push_value};

/// Postgres document store. `Clone` is cheap (the pool is reference counted).
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, DocumentStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the collection tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_collections(&self) -> Result<(), DocumentStoreError> {
        for collection in Collection::ALL {
            let table = collection.name();
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (seq BIGSERIAL PRIMARY KEY, doc JSONB NOT NULL)"
            ))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_collections", e))?;

            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {table}_doc_id_idx ON {table} ((doc->'id'))"
            ))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_collections", e))?;
        }
        Ok(())
    }
}

/// `seq` of the first document with the given application id.
fn first_match(table: &str) -> String {
    format!("SELECT seq FROM {table} WHERE doc->'id' = to_jsonb($1::bigint) ORDER BY seq LIMIT 1")
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn ping(&self) -> Result<(), DocumentStoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }

    #[instrument(skip(self, doc), err)]
    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<(), DocumentStoreError> {
        sqlx::query(&format!("INSERT INTO {} (doc) VALUES ($1)", collection.name()))
            .bind(doc)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_one", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn find_one(&self, collection: Collection, id: i64) -> Result<Option<Document>, DocumentStoreError> {
        let table = collection.name();
        let row = sqlx::query(&format!(
            "SELECT doc FROM {table} WHERE doc->'id' = to_jsonb($1::bigint) ORDER BY seq LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_one", e))?;

        row.map(|r| r.try_get::<Document, _>("doc"))
            .transpose()
            .map_err(|e| map_sqlx_error("find_one", e))
    }

    #[instrument(skip(self), err)]
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, DocumentStoreError> {
        let rows = sqlx::query(&format!("SELECT doc FROM {} ORDER BY seq", collection.name()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all", e))?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            docs.push(
                row.try_get::<Document, _>("doc")
                    .map_err(|e| map_sqlx_error("find_all", e))?,
            );
        }
        Ok(docs)
    }

    #[instrument(skip(self, doc), err)]
    async fn replace_one(
        &self,
        collection: Collection,
        id: i64,
        doc: Document,
    ) -> Result<u64, DocumentStoreError> {
        let table = collection.name();
        let result = sqlx::query(&format!(
            "UPDATE {table} SET doc = $2 WHERE seq = ({})",
            first_match(table)
        ))
        .bind(id)
        .bind(doc)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace_one", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn delete_one(&self, collection: Collection, id: i64) -> Result<u64, DocumentStoreError> {
        let table = collection.name();
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE seq = ({})", first_match(table)))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_one", e))?;
        Ok(result.rows_affected())
    }

    /// Read-modify-write under a row lock so concurrent pushes to the same
    /// document do not lose elements.
    #[instrument(skip(self, value), err)]
    async fn push(
        &self,
        collection: Collection,
        id: i64,
        field: &str,
        value: Document,
    ) -> Result<u64, DocumentStoreError> {
        let table = collection.name();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(&format!(
            "SELECT seq, doc FROM {table} WHERE doc->'id' = to_jsonb($1::bigint) ORDER BY seq LIMIT 1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("push", e))?;

        let Some(row) = row else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(0);
        };

        let seq: i64 = row.try_get("seq").map_err(|e| map_sqlx_error("push", e))?;
        let mut doc: Document = row.try_get("doc").map_err(|e| map_sqlx_error("push", e))?;

        if let Err(e) = push_value(&mut doc, collection, id, field, value) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(e);
        }

        sqlx::query(&format!("UPDATE {table} SET doc = $2 WHERE seq = $1"))
            .bind(seq)
            .bind(doc)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("push", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(1)
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> DocumentStoreError {
    match err {
        sqlx::Error::Database(db_err) => DocumentStoreError::Database {
            operation,
            message: db_err.message().to_string(),
        },
        sqlx::Error::PoolClosed => {
            DocumentStoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            DocumentStoreError::Unavailable(format!("timed out acquiring a connection in {operation}"))
        }
        other => DocumentStoreError::Database {
            operation,
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Runs only when `ROSTER_TEST_DATABASE_URL` points at a scratch database.
    async fn test_store() -> Option<PostgresDocumentStore> {
        let url = std::env::var("ROSTER_TEST_DATABASE_URL").ok()?;
        let store = PostgresDocumentStore::connect(&url, 2).await.ok()?;
        store.ensure_collections().await.ok()?;
        Some(store)
    }

    #[test]
    fn first_match_targets_lowest_seq() {
        let sql = first_match("departments");
        assert!(sql.starts_with("SELECT seq FROM departments"));
        assert!(sql.ends_with("ORDER BY seq LIMIT 1"));
    }

    #[test]
    fn pool_errors_map_to_unavailable() {
        let err = map_sqlx_error("find_all", sqlx::Error::PoolClosed);
        assert_eq!(
            err,
            DocumentStoreError::Unavailable("connection pool closed in find_all".to_string())
        );
    }

    #[tokio::test]
    async fn push_and_replace_against_postgres() {
        let Some(store) = test_store().await else {
            return;
        };
        // Ids far outside anything a human would pick keep reruns independent.
        let id = 7_300_000_000_i64 + i64::from(std::process::id());

        store
            .insert_one(Collection::Departments, json!({"id": id, "name": "pg", "employees": []}))
            .await
            .unwrap();
        assert_eq!(
            store
                .push(Collection::Departments, id, "employees", json!(1))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .push(Collection::Departments, id, "employees", json!(1))
                .await
                .unwrap(),
            1
        );
        let doc = store.find_one(Collection::Departments, id).await.unwrap().unwrap();
        assert_eq!(doc["employees"], json!([1, 1]));

        assert_eq!(
            store
                .replace_one(Collection::Departments, id, json!({"id": id, "name": "renamed", "employees": []}))
                .await
                .unwrap(),
            1
        );
        assert_eq!(store.delete_one(Collection::Departments, id).await.unwrap(), 1);
        assert!(store.find_one(Collection::Departments, id).await.unwrap().is_none());
    }
}
