//! Graph-boundary error types.

use crate::{EdgeId, VertexId};
use thiserror::Error;

/// Errors raised by the graph capability boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Vertex not found, or hidden by a visibility predicate.
    #[error("Vertex not found: {0}")]
    VertexNotFound(VertexId),

    /// Edge not found, or hidden by a visibility predicate.
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl GraphError {
    /// Returns true for the recoverable "element not found" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GraphError::VertexNotFound(_) | GraphError::EdgeNotFound(_)
        )
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
