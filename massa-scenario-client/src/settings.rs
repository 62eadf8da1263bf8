// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Build here the client settings from the configuration files and the environment
//!
//! ---
//! Sources are merged in this order, later ones overriding earlier ones:
//! 1. built-in defaults
//! 2. the file at `<PREFIX>_CONFIG_PATH` (`base_config/config.toml` by default), if it exists
//! 3. the file at `<PREFIX>_CONFIG_OVERRIDE_PATH` (`config/config.toml` by default), if it exists
//! 4. environment variables `<PREFIX>_<SECTION>__<KEY>`, e.g. `MASSA_SCENARIO_LOGGING__LEVEL=3`

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use massa_scenario_exports::{
    RunScenarioOptions, ScenarioConfig, DEFAULT_MAX_EXTERNAL_STEPS_DEPTH, DEFAULT_SCENARIO_SUFFIX,
};

/// Prefix of the environment variables read by the client
pub const ENV_PREFIX: &str = "MASSA_SCENARIO";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// 0 error, 1 warn, 2 info, 3 debug, 4 trace
    pub level: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ScenarioSettings {
    pub file_suffix: String,
    pub max_external_steps_depth: usize,
    /// glob patterns of scenarios skipped by directory runs
    pub excluded: Vec<String>,
    pub force_trace_gas: bool,
}

impl ScenarioSettings {
    pub fn config(&self) -> ScenarioConfig {
        ScenarioConfig {
            scenario_file_suffix: self.file_suffix.clone(),
            max_external_steps_depth: self.max_external_steps_depth,
        }
    }

    pub fn run_options(&self) -> RunScenarioOptions {
        RunScenarioOptions {
            force_trace_gas: self.force_trace_gas,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub scenario: ScenarioSettings,
}

/// Merges the setting sources listed in the module documentation
pub fn build_scenario_settings(env_prefix: &str) -> Result<Settings, ConfigError> {
    let config_path = std::env::var(format!("{}_CONFIG_PATH", env_prefix))
        .unwrap_or_else(|_| "base_config/config.toml".to_string());
    let config_override_path = std::env::var(format!("{}_CONFIG_OVERRIDE_PATH", env_prefix))
        .unwrap_or_else(|_| "config/config.toml".to_string());

    Config::builder()
        .set_default("logging.level", 1)?
        .set_default("scenario.file_suffix", DEFAULT_SCENARIO_SUFFIX)?
        .set_default(
            "scenario.max_external_steps_depth",
            DEFAULT_MAX_EXTERNAL_STEPS_DEPTH as i64,
        )?
        .set_default("scenario.excluded", Vec::<String>::new())?
        .set_default("scenario.force_trace_gas", false)?
        .add_source(File::with_name(&config_path).required(false))
        .add_source(File::with_name(&config_override_path).required(false))
        .add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("scenario.excluded"),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use massa_scenario_test_framework::ScenarioDir;
    use serial_test::serial;

    const TEST_PREFIX: &str = "MASSA_SCENARIO_TEST";

    fn clear_env() {
        for key in [
            "MASSA_SCENARIO_TEST_CONFIG_PATH",
            "MASSA_SCENARIO_TEST_CONFIG_OVERRIDE_PATH",
            "MASSA_SCENARIO_TEST_LOGGING__LEVEL",
            "MASSA_SCENARIO_TEST_SCENARIO__EXCLUDED",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_load_base_config() {
        clear_env();
        let settings = build_scenario_settings(TEST_PREFIX).unwrap();
        assert_eq!(settings.logging.level, 1);
        assert_eq!(settings.scenario.file_suffix, ".scen.json");
        assert_eq!(settings.scenario.config(), ScenarioConfig::default());
        assert_eq!(settings.scenario.run_options(), RunScenarioOptions::default());
    }

    #[test]
    #[serial]
    fn test_defaults_without_config_file() {
        clear_env();
        let dir = ScenarioDir::new();
        std::env::set_var(
            "MASSA_SCENARIO_TEST_CONFIG_PATH",
            dir.path().join("missing.toml"),
        );
        let settings = build_scenario_settings(TEST_PREFIX).unwrap();
        clear_env();
        assert_eq!(settings.scenario.max_external_steps_depth, 64);
        assert!(settings.scenario.excluded.is_empty());
        assert!(!settings.scenario.force_trace_gas);
    }

    #[test]
    #[serial]
    fn test_override_file_and_environment() {
        clear_env();
        let dir = ScenarioDir::new();
        let override_path = dir.write(
            "override.toml",
            "[scenario]\nmax_external_steps_depth = 4\nforce_trace_gas = true\n",
        );
        std::env::set_var("MASSA_SCENARIO_TEST_CONFIG_OVERRIDE_PATH", &override_path);
        std::env::set_var("MASSA_SCENARIO_TEST_LOGGING__LEVEL", "3");
        std::env::set_var("MASSA_SCENARIO_TEST_SCENARIO__EXCLUDED", "slow/*,broken.scen.json");
        let settings = build_scenario_settings(TEST_PREFIX).unwrap();
        clear_env();
        assert_eq!(settings.logging.level, 3);
        assert_eq!(settings.scenario.max_external_steps_depth, 4);
        assert!(settings.scenario.run_options().force_trace_gas);
        assert_eq!(
            settings.scenario.excluded,
            vec!["slow/*".to_string(), "broken.scen.json".to_string()]
        );
    }
}
