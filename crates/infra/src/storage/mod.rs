//! Entity-level storage adapter.
//!
//! `Storage` turns employee/department operations into single document-store
//! calls. Every call is bounded by the configured timeout; expiry aborts the
//! call and surfaces as [`StorageError::Timeout`]. Nothing is retried.
//!
//! Update and append report how many documents they matched and never fail on
//! zero: updating a missing employee, or appending to a missing department,
//! succeeds without creating anything.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use roster_core::{Department, DepartmentId, Employee, EmployeeId, Entity};

use crate::config::StorageConfig;
use crate::document_store::{
    Collection, Document, DocumentStore, DocumentStoreError, InMemoryDocumentStore,
    PostgresDocumentStore,
};


/// Storage failure taxonomy.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A lookup or delete matched zero documents.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error(transparent)]
    Backend(#[from] DocumentStoreError),

    /// A stored document does not decode into the expected record.
    #[error("malformed {kind} document: {source}")]
    Codec {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Timeout-bounded adapter over a [`DocumentStore`].
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl core::fmt::Debug for Storage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Storage")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new<S>(backend: S, timeout: Duration) -> Self
    where
        S: DocumentStore + 'static,
    {
        Self {
            backend: Arc::new(backend),
            timeout,
        }
    }

    /// In-memory backend with the default timeout (dev/tests).
    pub fn in_memory() -> Self {
        Self::new(InMemoryDocumentStore::new(), StorageConfig::default().timeout)
    }

    /// Build the backend selected by `config` and verify it answers.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let storage = match &config.database_url {
            Some(url) => {
                let store = PostgresDocumentStore::connect(url, config.max_connections).await?;
                store.ensure_collections().await?;
                Self::new(store, config.timeout)
            }
            None => Self::new(InMemoryDocumentStore::new(), config.timeout),
        };
        storage.checked().await
    }

    /// Ping the backend once, handing the adapter back only if it answers.
    pub async fn checked(self) -> Result<Self, StorageError> {
        self.ping().await?;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn ping(&self) -> Result<(), StorageError> {
        self.bounded("ping", self.backend.ping()).await
    }

    // -------------------------
    // Employees
    // -------------------------

    #[instrument(skip(self, employee), fields(employee_id = %employee.id), err)]
    pub async fn insert_employee(&self, employee: &Employee) -> Result<EmployeeId, StorageError> {
        self.insert(Collection::Employees, employee).await
    }

    #[instrument(skip(self))]
    pub async fn get_employee(&self, id: EmployeeId) -> Result<Employee, StorageError> {
        self.get(Collection::Employees, id).await
    }

    /// Every employee document in storage order.
    #[instrument(skip(self), err)]
    pub async fn list_employees(&self) -> Result<Vec<Employee>, StorageError> {
        self.list(Collection::Employees).await
    }

    /// Replace all fields (including `id`) of the first employee matching `id`.
    ///
    /// Returns the matched count; zero is not an error.
    #[instrument(skip(self, employee), err)]
    pub async fn update_employee(&self, id: EmployeeId, employee: &Employee) -> Result<u64, StorageError> {
        let doc = encode(employee)?;
        self.bounded(
            "update_employee",
            self.backend.replace_one(Collection::Employees, id.get(), doc),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_employee(&self, id: EmployeeId) -> Result<(), StorageError> {
        self.delete::<Employee>(Collection::Employees, id).await
    }

    // -------------------------
    // Departments
    // -------------------------

    #[instrument(skip(self, department), fields(department_id = %department.id), err)]
    pub async fn insert_department(&self, department: &Department) -> Result<DepartmentId, StorageError> {
        self.insert(Collection::Departments, department).await
    }

    #[instrument(skip(self))]
    pub async fn get_department(&self, id: DepartmentId) -> Result<Department, StorageError> {
        self.get(Collection::Departments, id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_department(&self, id: DepartmentId) -> Result<(), StorageError> {
        self.delete::<Department>(Collection::Departments, id).await
    }

    /// Append `employee_id` to the member list of the first matching department.
    ///
    /// Neither id is checked for existence. Returns the matched count; zero is
    /// not an error.
    #[instrument(skip(self), err)]
    pub async fn add_employee_to_department(
        &self,
        department_id: DepartmentId,
        employee_id: EmployeeId,
    ) -> Result<u64, StorageError> {
        self.bounded(
            "add_employee_to_department",
            self.backend.push(
                Collection::Departments,
                department_id.get(),
                "employees",
                Document::from(employee_id.get()),
            ),
        )
        .await
    }

    // -------------------------
    // Shared shapes
    // -------------------------

    async fn insert<T>(&self, collection: Collection, record: &T) -> Result<T::Id, StorageError>
    where
        T: Entity + Serialize,
    {
        let doc = encode(record)?;
        self.bounded("insert_one", self.backend.insert_one(collection, doc))
            .await?;
        Ok(record.id())
    }

    async fn get<T>(&self, collection: Collection, id: T::Id) -> Result<T, StorageError>
    where
        T: Entity + DeserializeOwned,
        T::Id: Into<i64>,
    {
        let raw: i64 = id.into();
        let doc = self
            .bounded("find_one", self.backend.find_one(collection, raw))
            .await?
            .ok_or(StorageError::NotFound { kind: T::KIND, id: raw })?;
        decode(doc)
    }

    async fn list<T>(&self, collection: Collection) -> Result<Vec<T>, StorageError>
    where
        T: Entity + DeserializeOwned,
    {
        self.bounded("find_all", self.backend.find_all(collection))
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    async fn delete<T>(&self, collection: Collection, id: T::Id) -> Result<(), StorageError>
    where
        T: Entity,
        T::Id: Into<i64>,
    {
        let raw: i64 = id.into();
        let deleted = self
            .bounded("delete_one", self.backend.delete_one(collection, raw))
            .await?;
        if deleted == 0 {
            return Err(StorageError::NotFound { kind: T::KIND, id: raw });
        }
        Ok(())
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, DocumentStoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(StorageError::from),
            Err(_elapsed) => Err(StorageError::Timeout {
                operation,
                after: self.timeout,
            }),
        }
    }
}

fn encode<T>(record: &T) -> Result<Document, StorageError>
where
    T: Entity + Serialize,
{
    serde_json::to_value(record).map_err(|source| StorageError::Codec { kind: T::KIND, source })
}

fn decode<T>(doc: Document) -> Result<T, StorageError>
where
    T: Entity + DeserializeOwned,
{
    serde_json::from_value(doc).map_err(|source| StorageError::Codec { kind: T::KIND, source })
}
