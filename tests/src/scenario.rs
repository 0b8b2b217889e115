//! Scenario definition and builder.

use weft_graph::{toy, MemoryGraph};
use weft_strategy::EngineConfig;
use weft_traversal::{Pipeline, TraversalResult};

use crate::assertion::{Assertion, AssertionBuilder};
use crate::error::ExampleResult;
use crate::runner::Runner;

/// Builds the pipeline a step runs.
pub type BuildFn = Box<dyn Fn() -> TraversalResult<Pipeline>>;

/// A step in a scenario with its assertion.
pub struct Step {
    /// Step name (for reporting).
    pub name: String,
    /// Builds the traversal. Construction errors count as step errors.
    pub build: BuildFn,
    /// Assertion to verify the result.
    pub assertion: Assertion,
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("assertion", &self.assertion)
            .finish()
    }
}

/// A complete test scenario.
pub struct Scenario {
    /// Scenario name (for reporting).
    name: String,
    /// Graph every step reads. Defaults to the modern toy graph.
    graph: MemoryGraph,
    /// Strategies to compile with. `None` runs pipelines as built.
    config: Option<EngineConfig>,
    /// Steps with assertions.
    steps: Vec<Step>,
}

impl Scenario {
    /// Create a new scenario over the modern toy graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: toy::modern(),
            config: None,
            steps: Vec::new(),
        }
    }

    /// Replace the graph.
    pub fn graph(mut self, graph: MemoryGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Compile every step with the strategies `config` enables.
    pub fn strategies(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Add a step with an assertion.
    pub fn step<B, F>(mut self, name: impl Into<String>, build: B, assertion_fn: F) -> Self
    where
        B: Fn() -> TraversalResult<Pipeline> + 'static,
        F: FnOnce(AssertionBuilder) -> AssertionBuilder,
    {
        let assertion = assertion_fn(AssertionBuilder::new()).build();
        self.steps.push(Step {
            name: name.into(),
            build: Box::new(build),
            assertion,
        });
        self
    }

    /// Run the scenario and return the result.
    pub fn run(&self) -> ExampleResult<()> {
        Runner::new(self)?.run()
    }

    /// Get the scenario name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph_ref(&self) -> &MemoryGraph {
        &self.graph
    }

    pub fn config(&self) -> Option<&EngineConfig> {
        self.config.as_ref()
    }

    /// Get the steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_builder() {
        let scenario = Scenario::new("test")
            .step("count", || Ok(Pipeline::new().v().count()), |a| a.value(6))
            .step("names", || Ok(Pipeline::new().v().values(&["name"])), |a| a.rows(6));

        assert_eq!(scenario.name(), "test");
        assert_eq!(scenario.steps().len(), 2);
        assert!(scenario.config().is_none());
    }
}
