// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::path::PathBuf;

use massa_scenario_exports::{FileResolver, RunScenarioOptions, ScenarioError, ScenarioRunner};
use massa_scenario_json::DefaultFileResolver;
use massa_scenario_models::scenario::Scenario;
use massa_scenario_test_framework::{init_tracing, ScenarioDir};

use crate::ScenarioController;

/// Records what it is asked to run; scenarios named "broken" fail
#[derive(Default)]
struct RecordingRunner {
    resets: usize,
    runs: Vec<(String, bool, bool)>,
    contexts: Vec<PathBuf>,
}

impl ScenarioRunner for RecordingRunner {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn run_scenario(
        &mut self,
        scenario: &mut Scenario,
        file_resolver: &dyn FileResolver,
    ) -> Result<(), ScenarioError> {
        self.runs
            .push((scenario.name.clone(), scenario.is_new_test, scenario.trace_gas));
        self.contexts.push(file_resolver.resolve_absolute_path("x"));
        if scenario.name == "broken" {
            return Err(ScenarioError::ExecutionError("boom".to_string()));
        }
        Ok(())
    }

    fn vm_type(&self) -> Vec<u8> {
        vec![5, 0]
    }
}

fn scenario(name: &str) -> String {
    format!(r#"{{"name": "{}", "steps": []}}"#, name)
}

#[test]
fn test_single_scenario_sets_context_and_forces_trace_gas() {
    init_tracing();
    let dir = ScenarioDir::new();
    let path = dir.write("sub/one.scen.json", &scenario("one"));
    let mut runner = RecordingRunner::default();
    {
        let mut controller =
            ScenarioController::new(&mut runner, Box::new(DefaultFileResolver::new()));
        controller
            .run_single_json_scenario(&path, RunScenarioOptions { force_trace_gas: true })
            .unwrap();
    }
    assert_eq!(runner.runs, vec![("one".to_string(), false, true)]);
    assert_eq!(runner.contexts, vec![dir.path().join("sub").join("x")]);
}

#[test]
fn test_single_scenario_errors() {
    let dir = ScenarioDir::new();
    let mut runner = RecordingRunner::default();
    let mut controller = ScenarioController::new(&mut runner, Box::new(DefaultFileResolver::new()));
    let missing = controller
        .run_single_json_scenario(&dir.path().join("missing.scen.json"), Default::default())
        .unwrap_err();
    assert!(matches!(missing, ScenarioError::IoError(_)));

    let path = dir.write("bad.scen.json", r#"{"steps": [{"step": "nope"}]}"#);
    let err = controller
        .run_single_json_scenario(&path, Default::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "error processing steps: unknown step type: nope");
}

#[test]
fn test_directory_run_counts_and_skips() {
    let dir = ScenarioDir::new();
    dir.write("tests/a.scen.json", &scenario("a"));
    dir.write("tests/b.scen.json", &scenario("broken"));
    dir.write("tests/skipped/c.scen.json", &scenario("c"));
    dir.write("tests/d.steps.json", &scenario("d"));
    let mut runner = RecordingRunner::default();
    let result = {
        let mut controller =
            ScenarioController::new(&mut runner, Box::new(DefaultFileResolver::new()));
        controller.run_all_json_scenarios_in_directory(
            dir.path(),
            "tests",
            ".scen.json",
            &["tests/skipped/*".to_string()],
            Default::default(),
        )
    };
    assert!(matches!(result, Err(ScenarioError::SomeTestsFailed)));
    assert_eq!(
        runner.runs,
        vec![
            ("a".to_string(), true, false),
            ("broken".to_string(), true, false)
        ]
    );
    assert_eq!(runner.resets, 2);
}

#[test]
fn test_directory_run_succeeds() {
    let dir = ScenarioDir::new();
    dir.write("a.scen.json", &scenario("a"));
    let mut runner = RecordingRunner::default();
    let mut controller = ScenarioController::new(&mut runner, Box::new(DefaultFileResolver::new()));
    controller
        .run_all_json_scenarios_in_directory(dir.path(), "", ".scen.json", &[], Default::default())
        .unwrap();
}
