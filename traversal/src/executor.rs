//! Pipeline execution.
//!
//! Execution is pull based: the iterator asks the last stage for a traverser,
//! each stage asks the one before it, and the first stage reads from the start
//! queue. Stateless steps run through the [`OperatorContext`]; the rest keep
//! their state in the stage.

use crate::operators::OperatorContext;
use crate::pattern::{MatchAlgorithm, MatchState};
use crate::{Pipeline, Projection, Step, TraversalResult, Traverser, TraverserSet};
use std::collections::{BTreeSet, HashSet, VecDeque};
use weft_core::Value;
use weft_graph::Graph;

enum StageState<'p> {
    Stateless,
    Dedup {
        labels: &'p [String],
        by: Option<&'p Projection>,
        seen: HashSet<Value>,
    },
    Limit {
        remaining: u64,
    },
    Count {
        total: u64,
    },
    Barrier(TraverserSet),
    Match(Box<MatchState<'p>>),
}

struct Stage<'p> {
    step: &'p Step,
    labels: &'p BTreeSet<String>,
    pending: VecDeque<Traverser>,
    state: StageState<'p>,
    /// Upstream is exhausted (or no longer needed).
    done: bool,
}

impl<'p> Stage<'p> {
    fn emit(&self, mut traverser: Traverser) -> Traverser {
        for label in self.labels {
            traverser = traverser.bind_current(label);
        }
        traverser
    }
}

/// A running pipeline. Yields result traversers in order.
///
/// After the first error the iterator is fused and yields nothing further.
pub struct TraversalIter<'p, 'g> {
    ctx: OperatorContext<'g>,
    starts: VecDeque<Traverser>,
    stages: Vec<Stage<'p>>,
    failed: bool,
}

impl<'p, 'g> TraversalIter<'p, 'g> {
    /// Prepare `pipeline` to run over `starts`.
    ///
    /// Every match step is planned here against the labels the starts carry
    /// plus those bound upstream of it, so validation errors surface before
    /// the first graph access.
    pub fn with_starts(
        pipeline: &'p Pipeline,
        graph: &'g dyn Graph,
        starts: Vec<Traverser>,
    ) -> TraversalResult<Self> {
        let upstream: BTreeSet<String> = starts
            .iter()
            .flat_map(|t| t.bindings.labels().map(str::to_string))
            .collect();

        let mut stages = Vec::with_capacity(pipeline.len());
        for (position, (step, labels)) in pipeline.iter().enumerate() {
            let state = match step {
                Step::Dedup { labels: keys, by } => StageState::Dedup {
                    labels: keys,
                    by: by.as_ref(),
                    seen: HashSet::new(),
                },
                Step::Limit(n) => StageState::Limit { remaining: *n },
                Step::Count => StageState::Count { total: 0 },
                Step::Barrier => StageState::Barrier(TraverserSet::new()),
                Step::Match(m) => {
                    let plan = m.plan(&pipeline.scope_at(&upstream, position))?;
                    StageState::Match(Box::new(MatchState::new(m, plan)))
                }
                _ => StageState::Stateless,
            };
            stages.push(Stage {
                step,
                labels,
                pending: VecDeque::new(),
                state,
                done: false,
            });
        }

        Ok(Self {
            ctx: OperatorContext::new(graph),
            starts: starts.into(),
            stages,
            failed: false,
        })
    }

    /// Join-order state of the match step at `position`, if there is one.
    pub fn match_algorithm(&self, position: usize) -> Option<&MatchAlgorithm> {
        match &self.stages.get(position)?.state {
            StageState::Match(state) => Some(state.algorithm()),
            _ => None,
        }
    }

    /// Drain into a vector, stopping at the first error.
    pub fn to_vec(self) -> TraversalResult<Vec<Traverser>> {
        self.collect()
    }

    /// Pull the next traverser out of `level` (0 is the start queue).
    fn pull(&mut self, level: usize) -> TraversalResult<Option<Traverser>> {
        if level == 0 {
            return Ok(self.starts.pop_front());
        }
        let index = level - 1;
        let ctx = self.ctx;

        loop {
            let stage = &mut self.stages[index];
            if let Some(traverser) = stage.pending.pop_front() {
                return Ok(Some(stage.emit(traverser)));
            }
            if let StageState::Match(state) = &mut stage.state {
                if let Some(traverser) = state.next(ctx.graph)? {
                    return Ok(Some(stage.emit(traverser)));
                }
            }
            if stage.done {
                return Ok(None);
            }

            match self.pull(level - 1)? {
                Some(traverser) => self.accept(index, traverser)?,
                None => self.finish(index),
            }
        }
    }

    fn accept(&mut self, index: usize, traverser: Traverser) -> TraversalResult<()> {
        let ctx = self.ctx;
        let stage = &mut self.stages[index];
        match &mut stage.state {
            StageState::Stateless => {
                let outputs = ctx.execute_step(stage.step, traverser)?;
                stage.pending.extend(outputs);
            }
            StageState::Dedup { labels, by, seen } => {
                if let Some(key) = ctx.dedup_key(*labels, *by, &traverser)? {
                    if seen.insert(key) {
                        stage.pending.push_back(traverser.with_bulk(1));
                    }
                }
            }
            StageState::Limit { remaining } => {
                let take = traverser.bulk.min(*remaining);
                *remaining -= take;
                if take > 0 {
                    stage.pending.push_back(traverser.with_bulk(take));
                }
                if *remaining == 0 {
                    stage.done = true;
                }
            }
            StageState::Count { total } => *total += traverser.bulk,
            StageState::Barrier(set) => set.add(traverser),
            StageState::Match(state) => state.admit(traverser),
        }
        Ok(())
    }

    /// Upstream ran dry: flush barriers and stop pulling.
    fn finish(&mut self, index: usize) {
        let stage = &mut self.stages[index];
        stage.done = true;
        match &mut stage.state {
            StageState::Count { total } => {
                let count = i64::try_from(*total).unwrap_or(i64::MAX);
                stage.pending.push_back(Traverser::new(Value::Int(count)));
            }
            StageState::Barrier(set) => {
                stage.pending.extend(std::mem::take(set));
            }
            _ => {}
        }
    }
}

impl<'p, 'g> Iterator for TraversalIter<'p, 'g> {
    type Item = TraversalResult<Traverser>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.pull(self.stages.len()) {
            Ok(Some(traverser)) => Some(Ok(traverser)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl Pipeline {
    /// Run a rooted pipeline from a single empty start.
    ///
    /// Pipelines that do not begin with a source yield nothing here; use
    /// [`Pipeline::execute_from`] to supply starts.
    pub fn execute<'p, 'g>(&'p self, graph: &'g dyn Graph) -> TraversalResult<TraversalIter<'p, 'g>> {
        let starts = if self.is_rooted() {
            vec![Traverser::new(Value::Null)]
        } else {
            Vec::new()
        };
        TraversalIter::with_starts(self, graph, starts)
    }

    /// Run the pipeline over the given start traversers.
    pub fn execute_from<'p, 'g>(
        &'p self,
        graph: &'g dyn Graph,
        starts: Vec<Traverser>,
    ) -> TraversalResult<TraversalIter<'p, 'g>> {
        TraversalIter::with_starts(self, graph, starts)
    }

    /// Run to completion and collect the results.
    pub fn to_list(&self, graph: &dyn Graph) -> TraversalResult<Vec<Traverser>> {
        self.execute(graph)?.to_vec()
    }
}
