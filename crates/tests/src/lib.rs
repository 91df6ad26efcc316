//! Integration test harness for galton.
//!
//! This crate provides utilities for end-to-end testing of the full
//! pipeline: Definition → Validate/Build → Execute → Analyze → Verify.

use galton_model::{Scenario, ScenarioDef, SimConfig, ValidationErrors};
use galton_runtime::{analyze, run, RunOptions, RunResult, SimulationReport};

/// Test harness for running simulations from JSON scenario definitions.
pub struct TestHarness {
    config: SimConfig,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            config: SimConfig::default(),
        }
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Build a scenario from JSON source.
    ///
    /// # Panics
    ///
    /// Panics if the JSON is malformed. Validation failures are returned
    /// so tests can assert on them.
    pub fn build(&self, json: &str) -> Result<Scenario, ValidationErrors> {
        let def: ScenarioDef = serde_json::from_str(json).expect("malformed scenario JSON");
        Scenario::build(def, &self.config)
    }

    /// Build a scenario that is expected to validate.
    ///
    /// # Panics
    ///
    /// Panics with the full error list if validation fails.
    pub fn build_ok(&self, json: &str) -> Scenario {
        self.build(json)
            .unwrap_or_else(|e| panic!("validation failed: {:?}", e.errors))
    }

    /// Execute a scenario sequentially with default options.
    ///
    /// # Panics
    ///
    /// Panics if execution fails.
    pub fn run(&self, scenario: &Scenario) -> RunResult {
        run(scenario, &RunOptions::default()).expect("run failed")
    }

    /// Execute a scenario with explicit options.
    ///
    /// # Panics
    ///
    /// Panics if execution fails.
    pub fn run_with(&self, scenario: &Scenario, options: &RunOptions) -> RunResult {
        run(scenario, options).expect("run failed")
    }

    /// Execute and analyze in one step.
    pub fn simulate(&self, scenario: &Scenario) -> SimulationReport {
        let result = self.run(scenario);
        analyze(&result, scenario)
    }
}
