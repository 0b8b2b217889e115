use crate::{IdentityRemovalStrategy, Strategy};
use tracing::debug;
use weft_traversal::{Pipeline, PatternExpr, Step, TraversalResult, WhereFilter};

/// Folds `where` steps that directly follow a `match` into the match.
///
/// Only `where` steps anchored on a start label are folded. Folding stops at
/// the first step that is labeled, unanchored, or would introduce a label the
/// match does not know. Matches that are labeled or retain a subset of their
/// bindings are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchPredicateStrategy;

impl MatchPredicateStrategy {
    pub const NAME: &'static str = "match_predicate";
}

/// The pattern unit equivalent to a where step, if there is one.
fn as_unit(filter: &WhereFilter) -> Option<PatternExpr> {
    match filter {
        WhereFilter::Compare {
            start: Some(start),
            op,
            other,
        } => Some(PatternExpr::compare(start.clone(), *op, other.clone())),
        WhereFilter::Traversal {
            start: Some(start),
            body,
            end,
        } => {
            let clause = match end {
                Some(end) => PatternExpr::clause(start.clone(), body.clone(), end.clone()),
                None => PatternExpr::filter(start.clone(), body.clone()),
            };
            Some(PatternExpr::where_(clause))
        }
        _ => None,
    }
}

impl Strategy for MatchPredicateStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn runs_after(&self) -> &[&'static str] {
        &[IdentityRemovalStrategy::NAME]
    }

    fn apply(&self, pipeline: &mut Pipeline) -> TraversalResult<()> {
        let mut position = 0;
        while position < pipeline.len() {
            let foldable = matches!(
                pipeline.step_at(position),
                Some(Step::Match(m)) if m.retained().is_none()
            ) && pipeline.labels_at(position).is_some_and(|l| l.is_empty());

            while foldable && position + 1 < pipeline.len() {
                let next_unlabeled = pipeline
                    .labels_at(position + 1)
                    .is_some_and(|l| l.is_empty());
                let unit = match pipeline.step_at(position + 1) {
                    Some(Step::Where(filter)) if next_unlabeled => as_unit(filter),
                    _ => None,
                };
                let Some(unit) = unit else {
                    break;
                };

                let Some(Step::Match(m)) = pipeline.step_at_mut(position) else {
                    break;
                };
                if let Err(err) = m.add_unit(unit) {
                    debug!(error = %err, "where step kept outside match");
                    break;
                }
                pipeline.remove(position + 1)?;
            }
            position += 1;
        }
        Ok(())
    }
}
