//! Weft Traversal Engine
//!
//! This crate provides the traversal model and its execution:
//! - Bindings and traversers (value, labels, bulk, loops)
//! - The step arena (`Pipeline`) and its mutation API
//! - Predicates and projections
//! - Pull-based execution over the `Graph` capability trait
//! - Multi-pattern `match` with pluggable join ordering

mod bindings;
mod builder;
mod error;
mod executor;
mod operators;
pub mod pattern;
mod pipeline;
mod predicate;
mod step;
mod traverser;

pub use bindings::*;
pub use builder::anon;
pub use error::*;
pub use executor::*;
pub use pattern::{
    AlgorithmKind, Clause, ClauseBody, MatchAlgorithm, MatchPlan, MatchStep, PatternExpr,
};
pub use pipeline::*;
pub use predicate::*;
pub use step::*;
pub use traverser::*;
