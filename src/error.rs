//! Domain Errors
//!
//! Common error type shared by the engine and every `TaskApi` implementation.

use serde::{Deserialize, Serialize};

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainError {
    NotFound(String),
    InvalidInput(String),
    Conflict(String),
    Internal(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

/// What the engine was doing when a collaborator call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Reorder,
    Complete,
    Delete,
    Create,
    Edit,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Reorder => "reorder",
            MutationKind::Complete => "complete",
            MutationKind::Delete => "delete",
            MutationKind::Create => "create",
            MutationKind::Edit => "edit",
        }
    }
}

/// Failure state kept per goal for the UI's error banner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncFailure {
    /// The canonical list could not be loaded; offer a retry
    Fetch(DomainError),
    /// A mutation was rejected and its overlay rolled back
    Mutation { action: MutationKind, error: DomainError },
}

impl SyncFailure {
    pub fn error(&self) -> &DomainError {
        match self {
            SyncFailure::Fetch(error) => error,
            SyncFailure::Mutation { error, .. } => error,
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, SyncFailure::Fetch(_))
    }
}

impl std::fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncFailure::Fetch(error) => write!(f, "Failed to load tasks: {}", error),
            SyncFailure::Mutation { action, error } => {
                write!(f, "Failed to {} task: {}", action.as_str(), error)
            }
        }
    }
}
