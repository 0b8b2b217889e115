//! Weft Strategy
//!
//! Pipeline rewriting before execution.
//!
//! Responsibilities:
//! - Register strategies and order them by their declared dependencies
//! - Apply every strategy to a pipeline and all of its nested pipelines
//! - Validate and freeze the result into a shareable compiled traversal
//! - Provide the built-in rewrites and the subgraph view

mod builtin;
mod config;
mod error;
mod registry;

pub use builtin::*;
pub use config::EngineConfig;
pub use error::{StrategyError, StrategyResult};
pub use registry::{CompiledTraversal, Strategy, StrategyRegistry};
