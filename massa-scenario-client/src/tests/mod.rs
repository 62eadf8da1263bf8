// Copyright (c) 2022 MASSA LABS <info@massa.net>

use massa_scenario_exports::DummyVmBuilder;
use massa_scenario_test_framework::{init_tracing, ScenarioDir};

use crate::cmds::run_scenarios_at_path;
use crate::settings::ScenarioSettings;

const PASSING: &str = r#"{
    "name": "transfer",
    "steps": [
        { "step": "setState", "accounts": { "address:a": { "nonce": "0", "balance": "100" } } },
        { "step": "transfer", "id": "1", "tx": { "from": "address:a", "to": "address:b", "egldValue": "30" } },
        { "step": "checkState", "accounts": {
            "address:a": { "nonce": "1", "balance": "70" },
            "address:b": { "balance": "30" }
        } }
    ]
}"#;

const FAILING: &str = r#"{
    "name": "wrong balance",
    "steps": [
        { "step": "setState", "accounts": { "address:a": { "balance": "100" } } },
        { "step": "checkState", "accounts": { "address:a": { "balance": "1" } } }
    ]
}"#;

fn settings(excluded: &[&str]) -> ScenarioSettings {
    ScenarioSettings {
        file_suffix: ".scen.json".to_string(),
        max_external_steps_depth: 8,
        excluded: excluded.iter().map(|pattern| pattern.to_string()).collect(),
        force_trace_gas: false,
    }
}

#[test]
fn test_run_single_file_and_directory() {
    init_tracing();
    let dir = ScenarioDir::new();
    let file = dir.write("transfer.scen.json", PASSING);
    dir.write("other/transfer.scen.json", PASSING);
    dir.write("notes.json", "not a scenario");

    run_scenarios_at_path(Box::new(DummyVmBuilder), &file, &settings(&[]), false).unwrap();
    run_scenarios_at_path(Box::new(DummyVmBuilder), dir.path(), &settings(&[]), true).unwrap();
}

#[test]
fn test_directory_run_reports_failures_and_skips_excluded() {
    let dir = ScenarioDir::new();
    dir.write("ok.scen.json", PASSING);
    dir.write("broken/wrong.scen.json", FAILING);

    let err = run_scenarios_at_path(Box::new(DummyVmBuilder), dir.path(), &settings(&[]), false)
        .unwrap_err();
    assert_eq!(err.to_string(), "some tests failed");

    run_scenarios_at_path(
        Box::new(DummyVmBuilder),
        dir.path(),
        &settings(&["broken/*"]),
        false,
    )
    .unwrap();
}

#[test]
fn test_single_file_error_is_returned() {
    let dir = ScenarioDir::new();
    let file = dir.write("wrong.scen.json", FAILING);
    let err = run_scenarios_at_path(Box::new(DummyVmBuilder), &file, &settings(&[]), false)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Check state: bad account balance. Account: address:a. Want: \"1\". Have: \"100\""
    );
}

#[test]
fn test_rejects_other_paths() {
    let dir = ScenarioDir::new();
    let notes = dir.write("notes.json", "{}");
    for path in [notes, dir.path().join("missing.scen.json")] {
        let err = run_scenarios_at_path(Box::new(DummyVmBuilder), &path, &settings(&[]), false)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "only directories and scenario files accepted as path"
        );
    }
}
