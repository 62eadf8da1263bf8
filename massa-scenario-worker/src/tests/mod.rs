// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::path::{Path, PathBuf};

use massa_scenario_exports::{
    DummyVmBuilder, RunScenarioOptions, ScenarioConfig, ScenarioError, VmBuilder,
};
use massa_scenario_io::ScenarioController;
use massa_scenario_json::DefaultFileResolver;
use massa_scenario_test_framework::{init_tracing, TestUniverse};

use crate::ScenarioExecutor;

mod mock_vm;

/// An executor and the VM builder it was created with
pub struct ExecutorTestUniverse {
    executor: ScenarioExecutor,
}

impl TestUniverse for ExecutorTestUniverse {
    type ModuleController = ScenarioExecutor;
    type ForeignControllers = Box<dyn VmBuilder>;
    type Config = ScenarioConfig;

    fn new(vm_builder: Self::ForeignControllers, config: Self::Config) -> Self {
        let universe = ExecutorTestUniverse {
            executor: ScenarioExecutor::new(vm_builder, config),
        };
        universe.initialize();
        universe
    }

    fn get_module_controller(&self) -> &Self::ModuleController {
        &self.executor
    }

    fn get_module_controller_mut(&mut self) -> &mut Self::ModuleController {
        &mut self.executor
    }
}

impl ExecutorTestUniverse {
    /// Executor over a dummy VM with the default configuration
    pub fn dummy() -> Self {
        Self::new(Box::new(DummyVmBuilder), ScenarioConfig::default())
    }

    /// Runs one scenario file the way the CLI does
    pub fn run(&mut self, path: &Path) -> Result<(), ScenarioError> {
        let mut controller = ScenarioController::new(
            self.get_module_controller_mut(),
            Box::new(DefaultFileResolver::new()),
        );
        controller.run_single_json_scenario(path, RunScenarioOptions::default())
    }

    /// Runs every scenario file of a directory the way the CLI does
    pub fn run_directory(&mut self, path: &Path) -> Result<(), ScenarioError> {
        let suffix = self.get_module_controller().config.scenario_file_suffix.clone();
        let mut controller = ScenarioController::new(
            self.get_module_controller_mut(),
            Box::new(DefaultFileResolver::new()),
        );
        controller.run_all_json_scenarios_in_directory(
            path,
            "",
            &suffix,
            &[],
            RunScenarioOptions::default(),
        )
    }
}

/// JSON scenarios checked in next to the tests
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/tests/scenarios")
}

/// `address:<name>` bytes
pub fn address(name: &str) -> Vec<u8> {
    let mut address = name.as_bytes().to_vec();
    address.resize(32, b'_');
    address
}

/// `sc:<name>` bytes for the dummy VM type
pub fn sc_address(name: &str) -> Vec<u8> {
    let mut address = vec![0u8; 10];
    address.extend_from_slice(name.as_bytes());
    address.resize(32, b'_');
    address
}

#[test]
fn test_universe_starts_with_empty_world() {
    init_tracing();
    let universe = ExecutorTestUniverse::dummy();
    assert!(universe.get_module_controller().world().accounts.is_empty());
}
