//! Built-in strategies.

mod identity;
mod incident;
mod match_algorithm;
mod match_predicate;
mod subgraph;

pub use identity::IdentityRemovalStrategy;
pub use incident::IncidentToAdjacentStrategy;
pub use match_algorithm::MatchAlgorithmStrategy;
pub use match_predicate::MatchPredicateStrategy;
pub use subgraph::{SubgraphGraph, SubgraphStrategy};
