//! Strategy registration, ordering and application.

use crate::{StrategyError, StrategyResult};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use weft_graph::Graph;
use weft_traversal::{Pipeline, TraversalIter, TraversalResult, Traverser};

/// A pipeline rewrite.
///
/// Strategies are applied once per pipeline, nested pipelines included. A
/// strategy that inserts steps must recognise its own insertions so that a
/// second application is a no-op.
pub trait Strategy: Send + Sync {
    /// Unique name, used for ordering constraints.
    fn name(&self) -> &'static str;

    /// Rewrite one pipeline in place. Nested pipelines are visited separately.
    fn apply(&self, pipeline: &mut Pipeline) -> TraversalResult<()>;

    /// Strategies that must run before this one.
    fn runs_after(&self) -> &[&'static str] {
        &[]
    }

    /// Strategies that must run after this one.
    fn runs_before(&self) -> &[&'static str] {
        &[]
    }
}

/// Registered strategies in dependency order.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn Strategy>>,
    /// Indices into `strategies`, in application order.
    order: Vec<usize>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy.
    ///
    /// Fails on a duplicate name or if the new constraints close a cycle; in
    /// both cases the registry is left unchanged.
    pub fn register(&mut self, strategy: impl Strategy + 'static) -> StrategyResult<()> {
        let name = strategy.name();
        if self.strategies.iter().any(|s| s.name() == name) {
            return Err(StrategyError::duplicate_strategy(name));
        }

        self.strategies.push(Box::new(strategy));
        match self.resolve_order() {
            Ok(order) => {
                self.order = order;
                Ok(())
            }
            Err(err) => {
                self.strategies.pop();
                Err(err)
            }
        }
    }

    /// Remove a strategy by name.
    pub fn remove(&mut self, name: &str) -> StrategyResult<Box<dyn Strategy>> {
        let index = self
            .strategies
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| StrategyError::unknown_strategy(name))?;
        let removed = self.strategies.remove(index);
        // Dropping a node never introduces a cycle.
        self.order = self.resolve_order()?;
        Ok(removed)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.iter().any(|s| s.name() == name)
    }

    /// Strategy names in application order.
    pub fn names(&self) -> Vec<&'static str> {
        self.order
            .iter()
            .map(|&i| self.strategies[i].name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Apply every strategy, in order, to `pipeline` and its nested pipelines.
    pub fn apply_all(&self, pipeline: &mut Pipeline) -> StrategyResult<()> {
        for &index in &self.order {
            let strategy = self.strategies[index].as_ref();
            let before = pipeline.len();
            apply_recursive(strategy, pipeline)?;
            debug!(
                strategy = strategy.name(),
                before,
                after = pipeline.len(),
                "strategy applied"
            );
        }
        Ok(())
    }

    /// Apply all strategies, validate, and freeze the pipeline.
    pub fn compile(&self, mut pipeline: Pipeline) -> StrategyResult<CompiledTraversal> {
        self.apply_all(&mut pipeline)?;
        pipeline.validate(&BTreeSet::new())?;
        Ok(CompiledTraversal {
            pipeline: Arc::new(pipeline),
        })
    }

    /// Topological order, ties broken by registration order.
    fn resolve_order(&self) -> StrategyResult<Vec<usize>> {
        let count = self.strategies.len();
        let index_of = |name: &str| self.strategies.iter().position(|s| s.name() == name);

        // edges[a] holds the strategies that must run after `a`.
        let mut edges: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); count];
        for (i, strategy) in self.strategies.iter().enumerate() {
            for after in strategy.runs_after() {
                if let Some(j) = index_of(after) {
                    edges[j].insert(i);
                }
            }
            for before in strategy.runs_before() {
                if let Some(j) = index_of(before) {
                    edges[i].insert(j);
                }
            }
        }

        let mut in_degree = vec![0usize; count];
        for targets in &edges {
            for &t in targets {
                in_degree[t] += 1;
            }
        }

        let mut order = Vec::with_capacity(count);
        let mut placed = vec![false; count];
        while order.len() < count {
            let Some(next) = (0..count).find(|&i| !placed[i] && in_degree[i] == 0) else {
                let strategies = (0..count)
                    .filter(|&i| !placed[i])
                    .map(|i| self.strategies[i].name().to_string())
                    .collect();
                return Err(StrategyError::ordering_cycle(strategies));
            };
            placed[next] = true;
            order.push(next);
            for &t in &edges[next] {
                in_degree[t] -= 1;
            }
        }
        Ok(order)
    }
}

fn apply_recursive(strategy: &dyn Strategy, pipeline: &mut Pipeline) -> TraversalResult<()> {
    strategy.apply(pipeline)?;
    for position in 0..pipeline.len() {
        if let Some(step) = pipeline.step_at_mut(position) {
            for child in step.children_mut() {
                apply_recursive(strategy, child)?;
            }
        }
    }
    Ok(())
}

/// A rewritten, validated pipeline.
///
/// Immutable and cheap to clone; one compiled traversal can be executed from
/// many threads at once against a shared graph.
#[derive(Debug, Clone)]
pub struct CompiledTraversal {
    pipeline: Arc<Pipeline>,
}

impl CompiledTraversal {
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Start an execution. Each execution owns its own step state.
    pub fn execute<'a, 'g>(&'a self, graph: &'g dyn Graph) -> TraversalResult<TraversalIter<'a, 'g>> {
        self.pipeline.execute(graph)
    }

    /// Run to completion and collect the results.
    pub fn to_list(&self, graph: &dyn Graph) -> TraversalResult<Vec<Traverser>> {
        self.pipeline.to_list(graph)
    }
}
