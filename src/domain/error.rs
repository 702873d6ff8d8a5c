//! Domain-level errors (no external dependencies)

use itertools::Itertools;
use thiserror::Error;

/// Domain errors represent violations of the tree contract.
/// None of them are transient, so nothing is ever retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required input was unusable (e.g. a node handle from another arena).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A structural link would break the single-parent or acyclicity rule.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// `TagBuilder::build` was called before every required field was set.
    #[error("cannot build tag, missing: {}", .missing.iter().join("; "))]
    IncompleteBuilder { missing: Vec<String> },

    /// The event stream was unbalanced; the whole assembly is aborted.
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        DomainError::InvalidArgument(msg.into())
    }

    pub fn illegal_state(msg: impl Into<String>) -> Self {
        DomainError::IllegalState(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        DomainError::MalformedInput(msg.into())
    }
}
