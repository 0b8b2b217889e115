use crate::Strategy;
use weft_core::Direction;
use weft_traversal::{Pipeline, Step, TraversalResult};

/// Rewrites `outE(l).inV()` to `out(l)` and `inE(l).outV()` to `in(l)`.
///
/// Only applies when the edge step is unlabeled, since the edge itself is
/// no longer observable afterwards. Labels on the vertex step move to the
/// merged step.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncidentToAdjacentStrategy;

impl IncidentToAdjacentStrategy {
    pub const NAME: &'static str = "incident_to_adjacent";
}

impl Strategy for IncidentToAdjacentStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, pipeline: &mut Pipeline) -> TraversalResult<()> {
        let mut position = 0;
        while position + 1 < pipeline.len() {
            let unlabeled = pipeline.labels_at(position).is_some_and(|l| l.is_empty());
            let merged = match (pipeline.step_at(position), pipeline.step_at(position + 1)) {
                (Some(Step::Incident { direction, labels }), Some(Step::EdgeVertex(end)))
                    if unlabeled && *direction != Direction::Both && *end == direction.opposite() =>
                {
                    Some(Step::Adjacent {
                        direction: *direction,
                        labels: labels.clone(),
                    })
                }
                _ => None,
            };

            if let Some(step) = merged {
                let (_, labels) = pipeline.remove(position + 1)?;
                pipeline.replace(position, step)?;
                for label in labels {
                    pipeline.add_label(position, label)?;
                }
            }
            position += 1;
        }
        Ok(())
    }
}
