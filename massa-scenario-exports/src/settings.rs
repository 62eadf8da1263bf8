// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Configuration of scenario runs

/// Suffix of the files picked up by a directory run
pub const DEFAULT_SCENARIO_SUFFIX: &str = ".scen.json";

/// Deepest allowed chain of `externalSteps` includes
pub const DEFAULT_MAX_EXTERNAL_STEPS_DEPTH: usize = 64;

/// Scenario executor configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// files ending with this suffix are scenarios
    pub scenario_file_suffix: String,
    /// `externalSteps` nested deeper than this fail instead of recursing
    pub max_external_steps_depth: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            scenario_file_suffix: DEFAULT_SCENARIO_SUFFIX.to_string(),
            max_external_steps_depth: DEFAULT_MAX_EXTERNAL_STEPS_DEPTH,
        }
    }
}

/// Per-run switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunScenarioOptions {
    /// trace gas whatever the scenario file says
    pub force_trace_gas: bool,
}
