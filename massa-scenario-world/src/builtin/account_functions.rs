// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::BigUint;

use massa_scenario_models::address::{is_smart_contract_address, ADDRESS_LENGTH, PROTECTED_KEY_PREFIX};
use massa_scenario_models::vm::{ContractCallInput, VmOutput};

use crate::world::World;

use super::{reject, BuiltinResult, ERR_INVALID_ARGUMENTS, ERR_OPERATION_NOT_PERMITTED};

/// Contract account called by its owner
fn owned_contract<'a>(
    world: &'a mut World,
    input: &ContractCallInput,
) -> Result<&'a mut crate::account::Account, super::BuiltinError> {
    if !is_smart_contract_address(&input.recipient_addr) {
        return Err(reject("invalid address"));
    }
    let contract = world
        .account_mut(&input.recipient_addr)
        .ok_or_else(|| reject("invalid address"))?;
    if contract.owner_address != input.vm_input.caller_addr {
        return Err(reject(ERR_OPERATION_NOT_PERMITTED));
    }
    Ok(contract)
}

pub(crate) fn change_owner_address(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    let arguments = &input.vm_input.arguments;
    if arguments.len() != 1 || arguments[0].len() != ADDRESS_LENGTH {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    owned_contract(world, input)?.owner_address = arguments[0].clone();
    Ok(VmOutput::default())
}

pub(crate) fn claim_developer_rewards(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    if !input.vm_input.arguments.is_empty() {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let contract = owned_contract(world, input)?;
    let reward = std::mem::take(&mut contract.developer_reward);
    world
        .accounts
        .get_or_create_account(&input.vm_input.caller_addr)
        .balance += &reward;

    let mut output = VmOutput::default();
    output.return_data.push(if reward == BigUint::default() {
        Vec::new()
    } else {
        reward.to_bytes_be()
    });
    Ok(output)
}

pub(crate) fn set_user_name(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    let arguments = &input.vm_input.arguments;
    if arguments.len() != 1 || arguments[0].is_empty() {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let account = world.accounts.get_or_create_account(&input.recipient_addr);
    if !account.username.is_empty() {
        return Err(reject("user name already set"));
    }
    account.username = arguments[0].clone();
    Ok(VmOutput::default())
}

pub(crate) fn save_key_value(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    if input.recipient_addr != input.vm_input.caller_addr {
        return Err(reject(ERR_OPERATION_NOT_PERMITTED));
    }
    let arguments = &input.vm_input.arguments;
    if arguments.len() < 2 || arguments.len() % 2 != 0 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    if arguments
        .chunks(2)
        .any(|pair| pair[0].starts_with(PROTECTED_KEY_PREFIX))
    {
        return Err(reject(ERR_OPERATION_NOT_PERMITTED));
    }
    let account = world.accounts.get_or_create_account(&input.recipient_addr);
    for pair in arguments.chunks(2) {
        account.save_key_value(pair[0].clone(), pair[1].clone());
    }
    Ok(VmOutput::default())
}
