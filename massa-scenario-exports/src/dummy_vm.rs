// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! VM stand-in for runs that only exercise the world and the builtin functions.
//!
//! Deployments are accepted without running any constructor, builtin
//! functions are forwarded to the world and any other call fails with
//! `ContractInvalid`.

use std::collections::BTreeMap;

use num::{BigInt, Zero};
use strum::IntoEnumIterator;
use tracing::debug;

use massa_scenario_models::address::DUMMY_VM_TYPE;
use massa_scenario_models::scenario::GasSchedule;
use massa_scenario_models::vm::{
    ContractCallInput, ContractCreateInput, GasScheduleMap, GasTrace, ReturnCode, VmOutput,
    UPGRADE_FUNCTION_NAME,
};
use massa_scenario_world::{is_builtin_function, BuiltinFunction, World, DEFAULT_CODE_METADATA};

use crate::controller_traits::{VmBuilder, VmInterface};
use crate::error::ScenarioError;

/// Operations listed in the `BaseOperationCost` section
const BASE_OPERATIONS: [&str; 7] = [
    "StorePerByte",
    "ReleasePerByte",
    "DataCopyPerByte",
    "PersistPerByte",
    "CompilePerByte",
    "AoTPreparePerByte",
    "GetCode",
];

/// Gas schedule where every known operation costs 1
pub fn dummy_gas_schedule_map() -> GasScheduleMap {
    let mut gas_map = GasScheduleMap::new();
    gas_map.insert(
        "BuiltInCost".to_string(),
        BuiltinFunction::iter()
            .map(|function| (function.to_string(), 1))
            .collect(),
    );
    gas_map.insert(
        "BaseOperationCost".to_string(),
        BASE_OPERATIONS
            .iter()
            .map(|operation| (operation.to_string(), 1))
            .collect(),
    );
    gas_map
}

/// Installs `arguments[0]` as the new code of the recipient, with
/// `arguments[1]` as code metadata. Only the owner may upgrade.
fn upgrade_contract(world: &World, input: &ContractCallInput) -> VmOutput {
    let Some(contract) = world.account(&input.recipient_addr) else {
        return VmOutput::failure(ReturnCode::ContractNotFound, "contract not found");
    };
    if contract.owner_address != input.vm_input.caller_addr {
        return VmOutput::failure(ReturnCode::UpgradeFailed, "upgrade not allowed");
    }
    let Some(code) = input.vm_input.arguments.first().filter(|code| !code.is_empty()) else {
        return VmOutput::failure(ReturnCode::UpgradeFailed, "missing contract code");
    };
    let mut output = VmOutput {
        gas_remaining: input.vm_input.gas_provided,
        ..Default::default()
    };
    let upgraded = output.output_account_mut(&input.recipient_addr);
    upgraded.code = code.clone();
    upgraded.code_metadata = match input.vm_input.arguments.get(1) {
        Some(metadata) if !metadata.is_empty() => metadata.clone(),
        _ => DEFAULT_CODE_METADATA.to_vec(),
    };
    upgraded.code_deployer_address = input.vm_input.caller_addr.clone();
    upgraded.balance_delta = BigInt::from(input.vm_input.call_value.clone());
    output
}

/// Builds `DummyVm` instances
#[derive(Debug, Clone, Default)]
pub struct DummyVmBuilder;

impl VmBuilder for DummyVmBuilder {
    fn vm_type(&self) -> Vec<u8> {
        DUMMY_VM_TYPE.to_vec()
    }

    fn gas_schedule_map(&self, gas_schedule: GasSchedule) -> Result<GasScheduleMap, ScenarioError> {
        if gas_schedule != GasSchedule::Dummy {
            debug!("dummy VM uses the dummy gas schedule instead of {}", gas_schedule);
        }
        Ok(dummy_gas_schedule_map())
    }

    fn new_vm(
        &self,
        _world: &World,
        _gas_schedule: &GasScheduleMap,
    ) -> Result<Box<dyn VmInterface>, ScenarioError> {
        Ok(Box::<DummyVm>::default())
    }
}

/// VM that cannot run contract code
#[derive(Debug, Default)]
pub struct DummyVm {
    trace_gas: bool,
    gas_trace: GasTrace,
}

impl DummyVm {
    fn record_gas(&mut self, address: &[u8], function: &str, gas_used: u64) {
        if !self.trace_gas {
            return;
        }
        self.gas_trace
            .entry(address.to_vec())
            .or_insert_with(BTreeMap::new)
            .entry(function.to_string())
            .or_default()
            .push(gas_used);
    }
}

impl VmInterface for DummyVm {
    fn run_smart_contract_create(
        &mut self,
        world: &mut World,
        input: &ContractCreateInput,
    ) -> Result<VmOutput, ScenarioError> {
        let caller = &input.vm_input.caller_addr;
        // the sender nonce was already incremented for this transaction
        let creator_nonce = world
            .account(caller)
            .map_or(0, |account| account.nonce.saturating_sub(1));
        let address = world.create_new_address(caller, creator_nonce);

        let mut output = VmOutput {
            gas_remaining: input.vm_input.gas_provided,
            ..Default::default()
        };
        let deployed = output.output_account_mut(&address);
        deployed.code = input.contract_code.clone();
        deployed.code_metadata = if input.contract_code_metadata.is_empty() {
            DEFAULT_CODE_METADATA.to_vec()
        } else {
            input.contract_code_metadata.clone()
        };
        deployed.code_deployer_address = caller.clone();
        deployed.balance_delta = BigInt::from(input.vm_input.call_value.clone());
        self.record_gas(&address, "init", 0);
        Ok(output)
    }

    fn run_smart_contract_call(
        &mut self,
        world: &mut World,
        input: &ContractCallInput,
    ) -> Result<VmOutput, ScenarioError> {
        self.record_gas(&input.recipient_addr, &input.function, 0);
        if is_builtin_function(&input.function) {
            return Ok(world.process_builtin_function(input)?);
        }
        if input.function == UPGRADE_FUNCTION_NAME {
            return Ok(upgrade_contract(world, input));
        }
        if !input.vm_input.call_value.is_zero() || !input.vm_input.esdt_transfers.is_empty() {
            debug!("dummy VM rejects payment to {}", input.function);
        }
        Ok(VmOutput::failure(
            ReturnCode::ContractInvalid,
            "dummy VM cannot execute contract code",
        ))
    }

    fn set_gas_tracing(&mut self, enable: bool) {
        self.trace_gas = enable;
    }

    fn gas_trace(&self) -> GasTrace {
        self.gas_trace.clone()
    }

    fn reset(&mut self) {
        self.gas_trace.clear();
    }
}
