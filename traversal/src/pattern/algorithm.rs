//! Join-order policies for the match evaluator.

use crate::{Bindings, TraversalError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Which join-order policy a match step uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    /// First ready unit in declaration order.
    Greedy,
    /// Ready unit with the lowest observed expansion factor.
    #[default]
    CountBased,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmKind::Greedy => write!(f, "greedy"),
            AlgorithmKind::CountBased => write!(f, "count_based"),
        }
    }
}

impl FromStr for AlgorithmKind {
    type Err = TraversalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(AlgorithmKind::Greedy),
            "count" | "count_based" | "countbased" => Ok(AlgorithmKind::CountBased),
            other => Err(TraversalError::config(format!(
                "unknown match algorithm '{}'",
                other
            ))),
        }
    }
}

/// Running selectivity statistics for one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitStats {
    pub inputs: u64,
    pub outputs: u64,
}

impl UnitStats {
    /// Outputs per input. Zero until the unit has run, so untried units are
    /// preferred.
    pub fn expansion(&self) -> f64 {
        if self.inputs == 0 {
            0.0
        } else {
            self.outputs as f64 / self.inputs as f64
        }
    }
}

/// A join-order policy instance.
///
/// Statistics live in the instance, so each executing match step owns its own.
#[derive(Debug, Clone)]
pub enum MatchAlgorithm {
    Greedy,
    CountBased { stats: Vec<UnitStats> },
}

impl MatchAlgorithm {
    pub fn new(kind: AlgorithmKind, units: usize) -> Self {
        match kind {
            AlgorithmKind::Greedy => MatchAlgorithm::Greedy,
            AlgorithmKind::CountBased => MatchAlgorithm::CountBased {
                stats: vec![UnitStats::default(); units],
            },
        }
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            MatchAlgorithm::Greedy => AlgorithmKind::Greedy,
            MatchAlgorithm::CountBased { .. } => AlgorithmKind::CountBased,
        }
    }

    /// Pick one of the `ready` unit indices (ascending declaration order).
    pub fn select_next(&self, ready: &[usize], bindings: &Bindings) -> Option<usize> {
        let chosen = match self {
            MatchAlgorithm::Greedy => ready.first().copied(),
            MatchAlgorithm::CountBased { stats } => {
                let mut best: Option<(usize, f64)> = None;
                for &unit in ready {
                    let cost = stats.get(unit).map(|s| s.expansion()).unwrap_or(0.0);
                    // Strict comparison keeps the earlier unit on ties.
                    if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                        best = Some((unit, cost));
                    }
                }
                best.map(|(unit, _)| unit)
            }
        };
        trace!(
            algorithm = %self.kind(),
            ready = ready.len(),
            bound = bindings.len(),
            chosen = ?chosen,
            "match unit selected"
        );
        chosen
    }

    /// Record one execution of `unit`.
    pub fn record(&mut self, unit: usize, inputs: u64, outputs: u64) {
        if let MatchAlgorithm::CountBased { stats } = self {
            if let Some(entry) = stats.get_mut(unit) {
                entry.inputs += inputs;
                entry.outputs += outputs;
            }
        }
    }

    pub fn stats(&self, unit: usize) -> Option<UnitStats> {
        match self {
            MatchAlgorithm::Greedy => None,
            MatchAlgorithm::CountBased { stats } => stats.get(unit).copied(),
        }
    }
}
