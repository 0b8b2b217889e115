use crate::Strategy;
use weft_traversal::{Pipeline, Step, TraversalResult};

/// Removes `identity()` steps that carry no labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityRemovalStrategy;

impl IdentityRemovalStrategy {
    pub const NAME: &'static str = "identity_removal";
}

impl Strategy for IdentityRemovalStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, pipeline: &mut Pipeline) -> TraversalResult<()> {
        for position in (0..pipeline.len()).rev() {
            let unlabeled = pipeline.labels_at(position).is_some_and(|l| l.is_empty());
            if unlabeled && matches!(pipeline.step_at(position), Some(Step::Identity)) {
                pipeline.remove(position)?;
            }
        }
        Ok(())
    }
}
