// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Tooling for crates testing against the scenario interfaces

use std::cell::RefCell;

use massa_scenario_models::address::DUMMY_VM_TYPE;
use massa_scenario_models::scenario::GasSchedule;
use massa_scenario_models::vm::GasScheduleMap;
use massa_scenario_world::World;

pub use crate::controller_traits::MockVmInterface;
use crate::controller_traits::{VmBuilder, VmInterface};
use crate::dummy_vm::dummy_gas_schedule_map;
use crate::error::ScenarioError;

/// Hands out one prepared VM, typically a `MockVmInterface`
pub struct PreparedVmBuilder {
    vm: RefCell<Option<Box<dyn VmInterface>>>,
}

impl PreparedVmBuilder {
    pub fn new(vm: Box<dyn VmInterface>) -> Self {
        PreparedVmBuilder {
            vm: RefCell::new(Some(vm)),
        }
    }
}

impl VmBuilder for PreparedVmBuilder {
    fn vm_type(&self) -> Vec<u8> {
        DUMMY_VM_TYPE.to_vec()
    }

    fn gas_schedule_map(&self, _gas_schedule: GasSchedule) -> Result<GasScheduleMap, ScenarioError> {
        Ok(dummy_gas_schedule_map())
    }

    fn new_vm(
        &self,
        _world: &World,
        _gas_schedule: &GasScheduleMap,
    ) -> Result<Box<dyn VmInterface>, ScenarioError> {
        self.vm
            .borrow_mut()
            .take()
            .ok_or_else(|| ScenarioError::VmError("prepared VM already handed out".to_string()))
    }
}
