use continuity_storage::StorageError;
use continuity_types::EntityKind;
use thiserror::Error;

pub type ContinuityResult<T> = Result<T, ContinuityError>;

/// Errors surfaced by the continuity engines.
///
/// Every domain variant names the offending entity so the presentation
/// layer can render a specific message. A record that exists only in
/// another tenant is reported as `NotFound`.
#[derive(Debug, Error)]
pub enum ContinuityError {
    #[error("invalid {entity} '{id}': {message}")]
    Validation {
        entity: EntityKind,
        id: String,
        message: String,
    },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },

    #[error("{entity} '{id}' is in the wrong state: {message}")]
    InvalidState {
        entity: EntityKind,
        id: String,
        message: String,
    },

    #[error("conflict on {entity} '{id}': {message}")]
    Conflict {
        entity: EntityKind,
        id: String,
        message: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ContinuityError {
    pub fn validation(entity: EntityKind, id: impl ToString, message: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            id: id.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_state(entity: EntityKind, id: impl ToString, message: impl Into<String>) -> Self {
        Self::InvalidState {
            entity,
            id: id.to_string(),
            message: message.into(),
        }
    }

    pub fn conflict(entity: EntityKind, id: impl ToString, message: impl Into<String>) -> Self {
        Self::Conflict {
            entity,
            id: id.to_string(),
            message: message.into(),
        }
    }

    /// Attribute a storage failure to the record being written.
    ///
    /// Status compare-and-set misses become `InvalidState`, missing rows
    /// become `NotFound`; anything else stays an infrastructure error.
    pub fn from_storage(entity: EntityKind, id: impl ToString, err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::not_found(entity, id),
            StorageError::StatusMismatch { .. } => {
                let message = err.to_string();
                Self::invalid_state(entity, id, message)
            }
            StorageError::AlreadyExists { .. } | StorageError::StaleRevision { .. } => {
                let message = err.to_string();
                Self::conflict(entity, id, message)
            }
            other => Self::Storage(other),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::Conflict { .. } => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Self::Validation { entity, .. }
            | Self::NotFound { entity, .. }
            | Self::InvalidState { entity, .. }
            | Self::Conflict { entity, .. } => Some(*entity),
            Self::Storage(_) => None,
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::Validation { id, .. }
            | Self::NotFound { id, .. }
            | Self::InvalidState { id, .. }
            | Self::Conflict { id, .. } => Some(id),
            Self::Storage(_) => None,
        }
    }
}
