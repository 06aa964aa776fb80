//! Domain error model.

use thiserror::Error;

/// Domain-level error.
///
/// Only input-shaped failures live here. Storage faults belong to the infra
/// crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid {kind} id {raw:?}: {reason}")]
    InvalidId {
        kind: &'static str,
        raw: String,
        reason: String,
    },
}

impl DomainError {
    pub fn invalid_id(kind: &'static str, raw: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidId {
            kind,
            raw: raw.into(),
            reason: reason.to_string(),
        }
    }
}
