use crate::Strategy;
use weft_traversal::{AlgorithmKind, Pipeline, Step, TraversalResult};

/// Sets the join-order algorithm of every match step.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAlgorithmStrategy {
    algorithm: AlgorithmKind,
}

impl MatchAlgorithmStrategy {
    pub const NAME: &'static str = "match_algorithm";

    pub fn new(algorithm: AlgorithmKind) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> AlgorithmKind {
        self.algorithm
    }
}

impl Strategy for MatchAlgorithmStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, pipeline: &mut Pipeline) -> TraversalResult<()> {
        for position in 0..pipeline.len() {
            if let Some(Step::Match(step)) = pipeline.step_at_mut(position) {
                step.set_algorithm(self.algorithm);
            }
        }
        Ok(())
    }
}
