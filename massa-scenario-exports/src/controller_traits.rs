// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Interfaces between the controller, the executor, the VM and the file system

use std::path::{Path, PathBuf};

use massa_scenario_models::scenario::{GasSchedule, Scenario};
use massa_scenario_models::vm::{
    ContractCallInput, ContractCreateInput, GasScheduleMap, GasTrace, VmOutput,
};
use massa_scenario_world::World;

use crate::error::ScenarioError;

/// Virtual machine under test.
///
/// The world is lent for the duration of each call; the VM must not keep it.
#[cfg_attr(any(test, feature = "test-exports"), mockall::automock)]
pub trait VmInterface {
    /// Deploys a contract
    fn run_smart_contract_create(
        &mut self,
        world: &mut World,
        input: &ContractCreateInput,
    ) -> Result<VmOutput, ScenarioError>;

    /// Calls a contract function
    fn run_smart_contract_call(
        &mut self,
        world: &mut World,
        input: &ContractCallInput,
    ) -> Result<VmOutput, ScenarioError>;

    /// Starts or stops recording gas usage per contract and function
    fn set_gas_tracing(&mut self, enable: bool);

    /// Gas recorded since tracing was enabled
    fn gas_trace(&self) -> GasTrace;

    /// Drops every cached contract and trace
    fn reset(&mut self);
}

/// Creates the VM and its world
pub trait VmBuilder {
    /// VM type embedded in generated contract addresses
    fn vm_type(&self) -> Vec<u8>;

    /// Empty world suited to this VM
    fn new_world(&self) -> World {
        World::new(self.vm_type())
    }

    /// Gas cost table selected by a scenario
    fn gas_schedule_map(&self, gas_schedule: GasSchedule) -> Result<GasScheduleMap, ScenarioError>;

    /// Instantiates the VM
    fn new_vm(
        &self,
        world: &World,
        gas_schedule: &GasScheduleMap,
    ) -> Result<Box<dyn VmInterface>, ScenarioError>;
}

/// Runs parsed scenarios, driven by the scenario controller
pub trait ScenarioRunner {
    /// Forgets all state before an independent scenario
    fn reset(&mut self);

    /// Runs every step of `scenario`, resolving files relative to `file_resolver`
    fn run_scenario(
        &mut self,
        scenario: &mut Scenario,
        file_resolver: &dyn FileResolver,
    ) -> Result<(), ScenarioError>;

    /// VM type used to interpret `sc:` addresses
    fn vm_type(&self) -> Vec<u8>;
}

/// Resolves file references found in scenario files
pub trait FileResolver {
    /// Path of the scenario file being interpreted
    fn set_context(&mut self, context_path: &Path);

    /// Path of `value` relative to the directory of the context file
    fn resolve_absolute_path(&self, value: &str) -> PathBuf;

    /// Contents of a `file:` reference, empty for an empty reference
    fn resolve_file_value(&self, value: &str) -> Result<Vec<u8>, ScenarioError>;

    /// Code of an `mxsc:` contract description file
    fn resolve_mxsc_value(&self, value: &str) -> Result<Vec<u8>, ScenarioError>;

    /// Returns a boxed clone of self.
    /// Useful to allow cloning `Box<dyn FileResolver>`.
    fn clone_box(&self) -> Box<dyn FileResolver>;
}

impl Clone for Box<dyn FileResolver> {
    fn clone(&self) -> Box<dyn FileResolver> {
        self.clone_box()
    }
}
