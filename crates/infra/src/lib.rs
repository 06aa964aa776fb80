//! Infrastructure layer: document store backends and the storage adapter.

pub mod config;
pub mod document_store;
pub mod storage;

pub use config::StorageConfig;
pub use document_store::{Collection, Document, DocumentStore, DocumentStoreError};
pub use storage::{Storage, StorageError};
