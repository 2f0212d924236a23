//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: missing label, duplicate id, cycle
    Validation,
    /// A referenced node (target or parent) does not exist
    NotFound,
    /// Broken structural invariant inside the arena
    Internal,
}

/// Domain errors represent tree rule violations.
/// All of them are raised before the tree is mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("label required")]
    LabelRequired,

    #[error("id required")]
    IdRequired,

    #[error("duplicate id: {0}")]
    DuplicateId(NodeId),

    #[error("cycle detected: {node} cannot be moved under {parent}")]
    CycleDetected { node: NodeId, parent: NodeId },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("parent not found: {0}")]
    ParentNotFound(NodeId),

    #[error("tree corrupted: {0}")]
    Corrupted(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::LabelRequired
            | DomainError::IdRequired
            | DomainError::DuplicateId(_)
            | DomainError::CycleDetected { .. } => ErrorKind::Validation,
            DomainError::NodeNotFound(_) | DomainError::ParentNotFound(_) => ErrorKind::NotFound,
            DomainError::Corrupted(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
