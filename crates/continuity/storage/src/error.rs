use continuity_types::EntityKind;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Why a tenant-scoped read or write was refused.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No row under this tenant. Rows owned by other tenants land here too.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: EntityKind, id: String },

    /// Another writer bumped the revision since it was read.
    #[error("workflow {id} is at revision {found}, expected {expected}")]
    StaleRevision { id: String, expected: u64, found: u64 },

    /// Lifecycle compare-and-set miss.
    #[error("{kind} {id} is {found}, expected {expected}")]
    StatusMismatch {
        kind: EntityKind,
        id: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub(crate) fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn already_exists(kind: EntityKind, id: impl ToString) -> Self {
        Self::AlreadyExists {
            kind,
            id: id.to_string(),
        }
    }
}
