//! Scenario runner.

use weft_strategy::StrategyRegistry;
use weft_traversal::Pipeline;

use crate::error::{ExampleError, ExampleResult};
use crate::render::render_all;
use crate::scenario::Scenario;

/// Runs a scenario against its graph.
pub struct Runner<'s> {
    scenario: &'s Scenario,
    registry: Option<StrategyRegistry>,
}

impl<'s> Runner<'s> {
    /// Create a new runner for a scenario.
    pub fn new(scenario: &'s Scenario) -> ExampleResult<Self> {
        let registry = scenario
            .config()
            .map(StrategyRegistry::from_config)
            .transpose()
            .map_err(|e| ExampleError::strategies(scenario.name(), e.to_string()))?;
        Ok(Self { scenario, registry })
    }

    /// Run the scenario.
    pub fn run(&self) -> ExampleResult<()> {
        let graph = self.scenario.graph_ref();

        for step in self.scenario.steps() {
            // Build, compile and execute; any failure is the step's result
            let result = (step.build)()
                .map_err(|e| e.to_string())
                .and_then(|pipeline| self.execute(pipeline))
                .map(|traversers| render_all(graph, &traversers));

            step.assertion.verify(&step.name, &result)?;
        }

        Ok(())
    }

    fn execute(&self, pipeline: Pipeline) -> Result<Vec<weft_traversal::Traverser>, String> {
        let graph = self.scenario.graph_ref();
        match &self.registry {
            Some(registry) => registry
                .compile(pipeline)
                .map_err(|e| e.to_string())?
                .to_list(graph)
                .map_err(|e| e.to_string()),
            None => pipeline.to_list(graph).map_err(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::scenario::Scenario;
    use weft_strategy::EngineConfig;
    use weft_traversal::Pipeline;

    #[test]
    fn test_runner_reports_failing_step() {
        let scenario = Scenario::new("test")
            .strategies(EngineConfig::default())
            .step("count", || Ok(Pipeline::new().v().count()), |a| a.value(7));

        let err = scenario.run().unwrap_err();

        assert!(err.to_string().contains("'count'"));
    }
}
