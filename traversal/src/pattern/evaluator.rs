//! The match evaluator.
//!
//! Each admitted traverser becomes a frame on a LIFO work stack. A frame
//! remembers which units it has consumed; popping it runs one more unit and
//! pushes one frame per surviving outcome. Frames with every unit consumed are
//! emitted, frames whose unit yields nothing are dropped.

use super::{Clause, ClauseBody, MatchAlgorithm, MatchPlan, MatchStep, PatternExpr};
use crate::{Bindings, TraversalIter, TraversalResult, Traverser};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{trace, warn};
use weft_core::Value;
use weft_graph::Graph;

/// Bindings that survived a unit, with the multiplicity they stand for.
type Outcome = (Bindings, u64);

struct Frame {
    bindings: Bindings,
    consumed: Vec<bool>,
    bulk: u64,
    loops: u32,
}

/// Runtime state of one match step inside one executing pipeline.
pub(crate) struct MatchState<'p> {
    step: &'p MatchStep,
    plan: MatchPlan,
    algorithm: MatchAlgorithm,
    stack: Vec<Frame>,
}

impl<'p> MatchState<'p> {
    pub(crate) fn new(step: &'p MatchStep, plan: MatchPlan) -> Self {
        Self {
            algorithm: MatchAlgorithm::new(step.algorithm(), step.units().len()),
            step,
            plan,
            stack: Vec::new(),
        }
    }

    pub(crate) fn algorithm(&self) -> &MatchAlgorithm {
        &self.algorithm
    }

    /// Start evaluating a traverser.
    pub(crate) fn admit(&mut self, traverser: Traverser) {
        let mut bindings = traverser.bindings;
        if let Some(start) = &self.plan.start_label {
            bindings = bindings.bind(start.clone(), traverser.value);
        }
        self.stack.push(Frame {
            bindings,
            consumed: vec![false; self.step.units().len()],
            bulk: traverser.bulk,
            loops: traverser.loops,
        });
    }

    /// Advance the work stack until a complete binding is found.
    pub(crate) fn next(&mut self, graph: &dyn Graph) -> TraversalResult<Option<Traverser>> {
        while let Some(frame) = self.stack.pop() {
            if frame.consumed.iter().all(|c| *c) {
                return Ok(Some(self.emit(frame)));
            }

            let ready: Vec<usize> = (0..frame.consumed.len())
                .filter(|&i| !frame.consumed[i] && frame.bindings.contains_all(&self.plan.requires[i]))
                .collect();
            let Some(unit) = self.algorithm.select_next(&ready, &frame.bindings) else {
                warn!(
                    bound = ?frame.bindings.labels().collect::<Vec<_>>(),
                    "match frame has pending units but none is ready; dropping"
                );
                continue;
            };

            let outcomes = apply(graph, &self.step.units()[unit], &frame.bindings)?;
            let produced = outcomes
                .iter()
                .fold(0u64, |sum, (_, m)| sum.saturating_add(frame.bulk.saturating_mul(*m)));
            self.algorithm.record(unit, frame.bulk, produced);
            if outcomes.is_empty() {
                trace!(unit, "dead branch");
            }

            // Reverse so the first outcome is evaluated first.
            for (bindings, multiplicity) in outcomes.into_iter().rev() {
                let mut consumed = frame.consumed.clone();
                consumed[unit] = true;
                self.stack.push(Frame {
                    bindings,
                    consumed,
                    bulk: frame.bulk.saturating_mul(multiplicity),
                    loops: frame.loops,
                });
            }
        }
        Ok(None)
    }

    fn emit(&self, frame: Frame) -> Traverser {
        let map: BTreeMap<String, Value> = self
            .plan
            .labels
            .iter()
            .filter_map(|label| {
                frame
                    .bindings
                    .get(label)
                    .map(|value| (label.clone(), value.clone()))
            })
            .collect();
        let bindings = match self.step.retained() {
            Some(keep) => frame.bindings.retain(keep),
            None => frame.bindings,
        };
        Traverser {
            value: Value::Map(map),
            bindings,
            bulk: frame.bulk,
            loops: frame.loops,
        }
    }
}

/// Run one pattern expression against a set of bindings.
fn apply(graph: &dyn Graph, expr: &PatternExpr, bindings: &Bindings) -> TraversalResult<Vec<Outcome>> {
    match expr {
        PatternExpr::Clause(clause) => apply_clause(graph, clause, bindings),
        PatternExpr::And(children) => solve(graph, children, bindings),
        PatternExpr::Or {
            children,
            exclusive,
        } => {
            let shared = expr.produces();
            let mut outcomes = Vec::new();
            for child in children {
                let results = apply(graph, child, bindings)?;
                let succeeded = !results.is_empty();
                // A child confirms each distinct binding once, whatever it
                // bound privately on the way.
                let mut seen = HashSet::new();
                for (result, _) in results {
                    let restricted = restrict(bindings, &result, &shared);
                    if seen.insert(restricted.clone()) {
                        outcomes.push((restricted, 1));
                    }
                }
                if *exclusive && succeeded {
                    break;
                }
            }
            Ok(outcomes)
        }
        PatternExpr::Not(child) => {
            if apply(graph, child, bindings)?.is_empty() {
                Ok(vec![(bindings.clone(), 1)])
            } else {
                Ok(Vec::new())
            }
        }
        PatternExpr::Where(child) => {
            if apply(graph, child, bindings)?.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(vec![(bindings.clone(), 1)])
            }
        }
    }
}

fn apply_clause(graph: &dyn Graph, clause: &Clause, bindings: &Bindings) -> TraversalResult<Vec<Outcome>> {
    let Some(start) = bindings.get(&clause.start) else {
        return Ok(Vec::new());
    };

    match &clause.body {
        ClauseBody::Compare { op, other } => {
            let passes = bindings.get(other).is_some_and(|o| op.test(start, o));
            Ok(if passes {
                vec![(bindings.clone(), 1)]
            } else {
                Vec::new()
            })
        }
        ClauseBody::Traversal(body) => {
            // The body sees a copy of the bindings; only output values come back.
            let seed = Traverser::with_bindings(start.clone(), bindings.clone());
            let outputs = TraversalIter::with_starts(body, graph, vec![seed])?;

            let Some(end) = &clause.end else {
                for output in outputs {
                    output?;
                    return Ok(vec![(bindings.clone(), 1)]);
                }
                return Ok(Vec::new());
            };

            let bound = bindings.get(end);
            let mut outcomes = Vec::new();
            for output in outputs {
                let output = output?;
                match bound {
                    Some(existing) if *existing == output.value => {
                        outcomes.push((bindings.clone(), output.bulk))
                    }
                    Some(_) => {}
                    None => outcomes.push((bindings.bind(end.clone(), output.value), output.bulk)),
                }
            }
            Ok(outcomes)
        }
    }
}

/// Evaluate a conjunction depth-first, running the first ready child each time.
fn solve(graph: &dyn Graph, units: &[PatternExpr], bindings: &Bindings) -> TraversalResult<Vec<Outcome>> {
    let requires: Vec<BTreeSet<String>> = PatternExpr::join_requirements(units);
    let mut outcomes = Vec::new();
    let mut stack = vec![(bindings.clone(), vec![false; units.len()], 1u64)];

    while let Some((current, consumed, multiplicity)) = stack.pop() {
        let next = (0..units.len()).find(|&i| !consumed[i] && current.contains_all(&requires[i]));
        match next {
            Some(i) => {
                for (result, m) in apply(graph, &units[i], &current)?.into_iter().rev() {
                    let mut consumed = consumed.clone();
                    consumed[i] = true;
                    stack.push((result, consumed, multiplicity.saturating_mul(m)));
                }
            }
            None if consumed.iter().all(|c| *c) => outcomes.push((current, multiplicity)),
            None => trace!("and-group has no ready child"),
        }
    }
    Ok(outcomes)
}

/// `base` plus the `shared` labels bound in `result`.
fn restrict(base: &Bindings, result: &Bindings, shared: &BTreeSet<String>) -> Bindings {
    shared.iter().fold(base.clone(), |acc, label| match result.get(label) {
        Some(value) => acc.bind(label.clone(), value.clone()),
        None => acc,
    })
}
