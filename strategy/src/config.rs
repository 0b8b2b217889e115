//! Engine configuration.

use crate::{
    IdentityRemovalStrategy, IncidentToAdjacentStrategy, MatchAlgorithmStrategy,
    MatchPredicateStrategy, StrategyRegistry, StrategyResult,
};
use serde::{Deserialize, Serialize};
use weft_traversal::AlgorithmKind;

/// Which standard strategies to register, and how matches pick join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub match_algorithm: AlgorithmKind,
    pub identity_removal: bool,
    pub incident_to_adjacent: bool,
    pub match_predicate: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_algorithm: AlgorithmKind::default(),
            identity_removal: true,
            incident_to_adjacent: true,
            match_predicate: true,
        }
    }
}

impl EngineConfig {
    pub fn with_match_algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.match_algorithm = algorithm;
        self
    }

    pub fn with_identity_removal(mut self, enabled: bool) -> Self {
        self.identity_removal = enabled;
        self
    }

    pub fn with_incident_to_adjacent(mut self, enabled: bool) -> Self {
        self.incident_to_adjacent = enabled;
        self
    }

    pub fn with_match_predicate(mut self, enabled: bool) -> Self {
        self.match_predicate = enabled;
        self
    }

    /// Parse from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> StrategyResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl StrategyRegistry {
    /// The standard registry for a configuration.
    pub fn from_config(config: &EngineConfig) -> StrategyResult<Self> {
        let mut registry = StrategyRegistry::new();
        if config.identity_removal {
            registry.register(IdentityRemovalStrategy)?;
        }
        if config.incident_to_adjacent {
            registry.register(IncidentToAdjacentStrategy)?;
        }
        if config.match_predicate {
            registry.register(MatchPredicateStrategy)?;
        }
        registry.register(MatchAlgorithmStrategy::new(config.match_algorithm))?;
        Ok(registry)
    }
}
