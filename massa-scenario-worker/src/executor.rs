// Copyright (c) 2022 MASSA LABS <info@massa.net>

use massa_scenario_exports::{
    FileResolver, ScenarioConfig, ScenarioError, ScenarioRunner, VmBuilder, VmInterface,
};
use massa_scenario_logging::massa_scenario_trace;
use massa_scenario_models::scenario::{GasSchedule, Scenario, Step};
use massa_scenario_models::ExprReconstructor;
use massa_scenario_world::World;
use tracing::debug;

use crate::gas_trace::{print_gas_trace, GasTraceStack};

/// Runs scenario steps against a world it owns.
///
/// The VM is created lazily by the first scenario, with the gas schedule
/// that scenario asks for, and kept until the executor is dropped.
pub struct ScenarioExecutor {
    pub(crate) world: World,
    pub(crate) vm_builder: Box<dyn VmBuilder>,
    pub(crate) vm: Option<Box<dyn VmInterface>>,
    pub(crate) check_gas: bool,
    pub(crate) gas_trace: GasTraceStack,
    pub(crate) file_resolver: Option<Box<dyn FileResolver>>,
    pub(crate) reconstructor: ExprReconstructor,
    pub(crate) config: ScenarioConfig,
    /// number of `externalSteps` currently being run
    pub(crate) external_depth: usize,
}

impl ScenarioExecutor {
    pub fn new(vm_builder: Box<dyn VmBuilder>, config: ScenarioConfig) -> Self {
        ScenarioExecutor {
            world: vm_builder.new_world(),
            vm_builder,
            vm: None,
            check_gas: true,
            gas_trace: GasTraceStack::default(),
            file_resolver: None,
            reconstructor: ExprReconstructor,
            config,
            external_depth: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Creates the VM and the builtin functions; no-op once the VM exists
    pub fn init_vm(&mut self, gas_schedule: GasSchedule) -> Result<(), ScenarioError> {
        if self.vm.is_some() {
            return Ok(());
        }
        let gas_schedule_map = self.vm_builder.gas_schedule_map(gas_schedule)?;
        self.world.init_builtin_functions(&gas_schedule_map);
        self.vm = Some(self.vm_builder.new_vm(&self.world, &gas_schedule_map)?);
        debug!("scenario VM initialized with the {} gas schedule", gas_schedule);
        Ok(())
    }

    /// Gas tracing switch of the scenario being run
    pub fn peek_trace_gas(&self) -> bool {
        self.gas_trace.peek()
    }

    /// Runs one step
    pub fn execute_step(&mut self, step: &Step) -> Result<(), ScenarioError> {
        massa_scenario_trace!("execute_step", { "kind": step.kind() });
        match step {
            Step::ExternalSteps(step) => return self.execute_external_steps_step(step),
            Step::SetState(step) => self.execute_set_state_step(step)?,
            Step::CheckState(step) => self.execute_check_state_step(step)?,
            Step::Tx(step) => {
                self.execute_tx_step(step)?;
            }
            Step::DumpState(step) => self.execute_dump_state_step(step)?,
        }
        self.log_gas_trace();
        Ok(())
    }

    fn set_gas_trace_in_metering(&mut self, enable: bool) {
        let trace_gas = enable && self.peek_trace_gas();
        if let Some(vm) = self.vm.as_mut() {
            vm.set_gas_tracing(trace_gas);
        }
    }

    fn log_gas_trace(&self) {
        if !self.peek_trace_gas() {
            return;
        }
        if let Some(vm) = self.vm.as_ref() {
            print_gas_trace(&vm.gas_trace(), &self.reconstructor);
        }
    }

    fn reset_gas_trace_if_new_test(&mut self, scenario: &mut Scenario) {
        if self.vm.is_none() || scenario.is_new_test {
            self.gas_trace.reset(scenario.trace_gas);
            scenario.is_new_test = false;
        }
    }
}

impl ScenarioRunner for ScenarioExecutor {
    fn reset(&mut self) {
        if let Some(vm) = self.vm.as_mut() {
            vm.reset();
        }
        self.world.clear();
    }

    fn run_scenario(
        &mut self,
        scenario: &mut Scenario,
        file_resolver: &dyn FileResolver,
    ) -> Result<(), ScenarioError> {
        massa_scenario_trace!("run_scenario", {
            "name": scenario.name,
            "steps": scenario.steps.len()
        });
        self.file_resolver = Some(file_resolver.clone_box());
        self.check_gas = scenario.check_gas;
        self.reset_gas_trace_if_new_test(scenario);
        self.init_vm(scenario.gas_schedule)?;

        for step in &scenario.steps {
            self.set_gas_trace_in_metering(true);
            let result = self.execute_step(step);
            self.set_gas_trace_in_metering(false);
            result?;
        }
        Ok(())
    }

    fn vm_type(&self) -> Vec<u8> {
        self.vm_builder.vm_type()
    }
}
