//! Strategy error types.

use thiserror::Error;
use weft_traversal::TraversalError;

/// Errors raised while registering or applying strategies.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The declared before/after constraints cannot all be satisfied.
    #[error("Strategy ordering cycle between: {}", strategies.join(", "))]
    OrderingCycle { strategies: Vec<String> },

    #[error("Unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("Duplicate strategy: {name}")]
    DuplicateStrategy { name: String },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error(transparent)]
    Traversal(#[from] TraversalError),
}

impl StrategyError {
    pub fn ordering_cycle(strategies: Vec<String>) -> Self {
        Self::OrderingCycle { strategies }
    }

    pub fn unknown_strategy(name: impl Into<String>) -> Self {
        Self::UnknownStrategy { name: name.into() }
    }

    pub fn duplicate_strategy(name: impl Into<String>) -> Self {
        Self::DuplicateStrategy { name: name.into() }
    }
}

/// Result type for strategy operations.
pub type StrategyResult<T> = Result<T, StrategyError>;
