//! Multi-pattern matching.
//!
//! A `match` step joins a set of pattern expressions that share labels. The
//! plan fixes which label the incoming value binds and checks that every label
//! can be reached; the evaluator then consumes units one at a time in the
//! order chosen by a `MatchAlgorithm`.

mod algorithm;
mod clause;
mod evaluator;
mod plan;

pub use algorithm::*;
pub use clause::*;
pub(crate) use evaluator::MatchState;
pub use plan::*;
