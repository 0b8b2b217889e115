//! Traversal error types.

use thiserror::Error;
use weft_core::GraphError;

/// Pattern problems detected before any traverser is admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A label is required by some pattern but nothing can ever bind it.
    #[error("Unreachable pattern label '{label}'")]
    UnreachableLabel { label: String },

    /// A WHERE or NOT pattern references a label no plain pattern binds.
    #[error("where/not pattern would introduce label '{label}'")]
    WhereIntroducesLabel { label: String },

    /// More than one independent root label: the pattern cannot be joined.
    #[error("The provided match pattern is unsolvable: roots {roots:?}")]
    UnsolvablePattern { roots: Vec<String> },

    /// Empty connective, empty pattern list, or similar.
    #[error("Malformed pattern expression: {message}")]
    MalformedExpression { message: String },
}

impl ValidationError {
    pub fn unreachable_label(label: impl Into<String>) -> Self {
        Self::UnreachableLabel {
            label: label.into(),
        }
    }

    pub fn where_introduces_label(label: impl Into<String>) -> Self {
        Self::WhereIntroducesLabel {
            label: label.into(),
        }
    }

    pub fn unsolvable_pattern(roots: Vec<String>) -> Self {
        Self::UnsolvablePattern { roots }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedExpression {
            message: message.into(),
        }
    }
}

/// Result type for pattern validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors that can occur while building or executing a traversal.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// Pattern validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A graph lookup failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A step received a value it cannot operate on.
    #[error("type error: {message}")]
    Type { message: String },

    /// Pipeline mutation outside the step range.
    #[error("Position {position} out of range for pipeline of length {len}")]
    Position { position: usize, len: usize },

    /// A predicate could not be constructed.
    #[error("Invalid predicate: {message}")]
    InvalidPredicate { message: String },

    /// Invalid engine configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl TraversalError {
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    pub fn position(position: usize, len: usize) -> Self {
        Self::Position { position, len }
    }

    pub fn invalid_predicate(message: impl Into<String>) -> Self {
        Self::InvalidPredicate {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True if this wraps a graph "not found" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TraversalError::Graph(err) if err.is_not_found())
    }
}

/// Result type for traversal operations.
pub type TraversalResult<T> = Result<T, TraversalError>;
