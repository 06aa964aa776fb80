//! Storage configuration.

use std::time::Duration;

/// Per-call bound applied to every storage operation.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default sqlx pool size for the Postgres backend.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// How to reach the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Postgres connection URL. `None` selects the in-memory backend.
    pub database_url: Option<String>,
    pub timeout: Duration,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            timeout: DEFAULT_STORAGE_TIMEOUT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl StorageConfig {
    pub fn is_persistent(&self) -> bool {
        self.database_url.is_some()
    }
}
