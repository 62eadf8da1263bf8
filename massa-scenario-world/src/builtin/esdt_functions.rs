// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::BigUint;

use massa_scenario_models::address::{ADDRESS_LENGTH, ESDT_SYSTEM_SC_ADDRESS};
use massa_scenario_models::vm::{ContractCallInput, EsdtTokenType, LogEntry, VmOutput};

use crate::esdt::storage::bytes_to_nonce;
use crate::esdt::{
    nonce_to_bytes, roles, EsdtMetadata, EsdtToken, EGLD_TOKEN_IDENTIFIER, MAX_ROYALTIES,
};
use crate::world::World;

use super::convert::biguint_to_bytes;
use super::{
    reject, BuiltinError, BuiltinResult, ERR_ACTION_NOT_ALLOWED, ERR_INSUFFICIENT_FUNDS,
    ERR_INVALID_ARGUMENTS, ERR_INVALID_RECEIVER,
};

fn transfer_log(input: &ContractCallInput, token: &[u8], nonce: u64, value: &BigUint, destination: &[u8]) -> LogEntry {
    LogEntry {
        identifier: input.function.as_bytes().to_vec(),
        address: input.vm_input.caller_addr.clone(),
        topics: vec![
            token.to_vec(),
            nonce_to_bytes(nonce),
            biguint_to_bytes(value),
            destination.to_vec(),
        ],
        data: Vec::new(),
    }
}

fn require_self_call(input: &ContractCallInput) -> Result<(), BuiltinError> {
    if input.recipient_addr != input.vm_input.caller_addr {
        return Err(reject(ERR_INVALID_RECEIVER));
    }
    Ok(())
}

fn require_role(world: &World, holder: &[u8], token: &[u8], role: &[u8]) -> Result<(), BuiltinError> {
    let allowed = match world.account(holder) {
        Some(account) => account.has_esdt_role(token, role)?,
        None => false,
    };
    if !allowed {
        return Err(reject(ERR_ACTION_NOT_ALLOWED));
    }
    Ok(())
}

fn positive_value(bytes: &[u8]) -> Result<BigUint, BuiltinError> {
    let value = BigUint::from_bytes_be(bytes);
    if value.bits() == 0 {
        return Err(reject("negative value"));
    }
    Ok(value)
}

/// Moves `value` of one token instance, checked before anything is written
fn move_esdt(
    world: &mut World,
    from: &[u8],
    to: &[u8],
    token: &[u8],
    nonce: u64,
    value: &BigUint,
) -> Result<(), BuiltinError> {
    if to.len() != ADDRESS_LENGTH {
        return Err(reject(ERR_INVALID_RECEIVER));
    }
    let sender = world
        .account_mut(from)
        .ok_or_else(|| reject(ERR_INSUFFICIENT_FUNDS))?;
    let mut sent = sender
        .esdt_token(token, nonce)?
        .ok_or_else(|| reject(ERR_INSUFFICIENT_FUNDS))?;
    if sent.value < *value {
        return Err(reject(ERR_INSUFFICIENT_FUNDS));
    }
    if sent.is_frozen() {
        return Err(reject("ESDT is frozen for this account"));
    }
    sent.value -= value;
    sender.save_esdt_token(token, nonce, &sent)?;

    let receiver = world.accounts.get_or_create_account(to);
    let received = match receiver.esdt_token(token, nonce)? {
        Some(mut existing) => {
            existing.value += value;
            existing
        }
        None => EsdtToken {
            token_type: sent.token_type,
            value: value.clone(),
            properties: Vec::new(),
            metadata: sent.metadata,
        },
    };
    receiver.set_esdt_token(token, nonce, &received)?;
    Ok(())
}

fn move_egld(world: &mut World, from: &[u8], to: &[u8], value: &BigUint) -> Result<(), BuiltinError> {
    if to.len() != ADDRESS_LENGTH {
        return Err(reject(ERR_INVALID_RECEIVER));
    }
    world
        .account_mut(from)
        .ok_or_else(|| reject(ERR_INSUFFICIENT_FUNDS))?
        .sub_from_balance(value)
        .map_err(|_| reject(ERR_INSUFFICIENT_FUNDS))?;
    world.accounts.get_or_create_account(to).balance += value;
    Ok(())
}

pub(crate) fn esdt_transfer(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    let arguments = &input.vm_input.arguments;
    if arguments.len() < 2 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let token = &arguments[0];
    let value = positive_value(&arguments[1])?;
    let caller = &input.vm_input.caller_addr;
    move_esdt(world, caller, &input.recipient_addr, token, 0, &value)?;

    let mut output = VmOutput::default();
    output.output_account_mut(&input.recipient_addr);
    output
        .logs
        .push(transfer_log(input, token, 0, &value, &input.recipient_addr));
    Ok(output)
}

pub(crate) fn esdt_nft_transfer(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    require_self_call(input)?;
    let arguments = &input.vm_input.arguments;
    if arguments.len() < 4 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let token = &arguments[0];
    let nonce = bytes_to_nonce(&arguments[1]);
    if nonce == 0 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let value = positive_value(&arguments[2])?;
    let destination = &arguments[3];
    move_esdt(world, &input.vm_input.caller_addr, destination, token, nonce, &value)?;

    let mut output = VmOutput::default();
    output.output_account_mut(destination);
    output
        .logs
        .push(transfer_log(input, token, nonce, &value, destination));
    Ok(output)
}

pub(crate) fn multi_esdt_nft_transfer(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    require_self_call(input)?;
    let arguments = &input.vm_input.arguments;
    if arguments.len() < 2 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let destination = &arguments[0];
    let count = bytes_to_nonce(&arguments[1]);
    let transfers_end = usize::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(3))
        .and_then(|length| length.checked_add(2));
    let transfers_end = match transfers_end {
        Some(end) if count != 0 && arguments[1].len() <= 8 && end <= arguments.len() => end,
        _ => return Err(reject(ERR_INVALID_ARGUMENTS)),
    };
    let caller = &input.vm_input.caller_addr;
    let mut output = VmOutput::default();
    output.output_account_mut(destination);
    for transfer in arguments[2..transfers_end].chunks_exact(3) {
        let token = &transfer[0];
        let nonce = bytes_to_nonce(&transfer[1]);
        let value = positive_value(&transfer[2])?;
        if token.as_slice() == EGLD_TOKEN_IDENTIFIER {
            move_egld(world, caller, destination, &value)?;
        } else {
            move_esdt(world, caller, destination, token, nonce, &value)?;
        }
        output
            .logs
            .push(transfer_log(input, token, nonce, &value, destination));
    }
    Ok(output)
}

pub(crate) fn esdt_local_mint(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    require_self_call(input)?;
    let arguments = &input.vm_input.arguments;
    if arguments.len() != 2 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let token = &arguments[0];
    let caller = &input.vm_input.caller_addr;
    require_role(world, caller, token, roles::LOCAL_MINT)?;
    let value = positive_value(&arguments[1])?;

    let account = world.accounts.get_or_create_account(caller);
    let mut held = account
        .esdt_token(token, 0)?
        .unwrap_or_else(|| EsdtToken::fungible(BigUint::default()));
    held.value += &value;
    account.set_esdt_token(token, 0, &held)?;

    let mut output = VmOutput::default();
    output.logs.push(LogEntry {
        identifier: input.function.as_bytes().to_vec(),
        address: caller.clone(),
        topics: vec![token.clone(), Vec::new(), biguint_to_bytes(&value)],
        data: Vec::new(),
    });
    Ok(output)
}

pub(crate) fn esdt_local_burn(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    require_self_call(input)?;
    let arguments = &input.vm_input.arguments;
    if arguments.len() != 2 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let token = &arguments[0];
    let caller = &input.vm_input.caller_addr;
    require_role(world, caller, token, roles::LOCAL_BURN)?;
    let value = positive_value(&arguments[1])?;
    burn(world, caller, token, 0, &value)?;

    let mut output = VmOutput::default();
    output.logs.push(LogEntry {
        identifier: input.function.as_bytes().to_vec(),
        address: caller.clone(),
        topics: vec![token.clone(), Vec::new(), biguint_to_bytes(&value)],
        data: Vec::new(),
    });
    Ok(output)
}

fn burn(world: &mut World, holder: &[u8], token: &[u8], nonce: u64, value: &BigUint) -> Result<(), BuiltinError> {
    let account = world
        .account_mut(holder)
        .ok_or_else(|| reject(ERR_INSUFFICIENT_FUNDS))?;
    let mut held = account
        .esdt_token(token, nonce)?
        .ok_or_else(|| reject(ERR_INSUFFICIENT_FUNDS))?;
    if held.value < *value {
        return Err(reject(ERR_INSUFFICIENT_FUNDS));
    }
    held.value -= value;
    account.save_esdt_token(token, nonce, &held)?;
    Ok(())
}

pub(crate) fn esdt_nft_create(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    require_self_call(input)?;
    let arguments = &input.vm_input.arguments;
    if arguments.len() < 7 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let token = &arguments[0];
    let caller = &input.vm_input.caller_addr;
    require_role(world, caller, token, roles::NFT_CREATE)?;
    let quantity = positive_value(&arguments[1])?;
    let royalties = bytes_to_nonce(&arguments[3]);
    if arguments[3].len() > 8 || royalties > MAX_ROYALTIES {
        return Err(reject("invalid arguments, royalties cannot exceed 10000"));
    }

    let account = world.accounts.get_or_create_account(caller);
    let nonce = account
        .esdt_last_nonce(token)
        .checked_add(1)
        .ok_or_else(|| reject("invalid arguments, no nonce left for the token"))?;
    let created = EsdtToken {
        token_type: EsdtTokenType::NonFungible,
        value: quantity.clone(),
        properties: Vec::new(),
        metadata: Some(EsdtMetadata {
            nonce,
            name: arguments[2].clone(),
            creator: caller.clone(),
            royalties: u32::try_from(royalties).map_err(|_| reject(ERR_INVALID_ARGUMENTS))?,
            hash: arguments[4].clone(),
            attributes: arguments[5].clone(),
            uris: arguments[6..].to_vec(),
        }),
    };
    account.set_esdt_token(token, nonce, &created)?;
    account.set_esdt_last_nonce(token, nonce);

    let mut output = VmOutput::default();
    output.return_data.push(nonce_to_bytes(nonce));
    output.logs.push(LogEntry {
        identifier: input.function.as_bytes().to_vec(),
        address: caller.clone(),
        topics: vec![token.clone(), nonce_to_bytes(nonce), biguint_to_bytes(&quantity)],
        data: Vec::new(),
    });
    Ok(output)
}

/// Loads an NFT instance of the caller after the role and argument checks
fn caller_nft(
    world: &World,
    input: &ContractCallInput,
    role: &[u8],
    min_arguments: usize,
) -> Result<(Vec<u8>, u64, EsdtToken), BuiltinError> {
    require_self_call(input)?;
    let arguments = &input.vm_input.arguments;
    if arguments.len() < min_arguments {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let token = arguments[0].clone();
    let nonce = bytes_to_nonce(&arguments[1]);
    let caller = &input.vm_input.caller_addr;
    require_role(world, caller, &token, role)?;
    let held = world
        .account(caller)
        .map(|account| account.esdt_token(&token, nonce))
        .transpose()?
        .flatten()
        .ok_or_else(|| reject("new NFT data on sender"))?;
    Ok((token, nonce, held))
}

pub(crate) fn esdt_nft_add_quantity(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    let (token, nonce, mut held) = caller_nft(world, input, roles::NFT_ADD_QUANTITY, 3)?;
    let value = positive_value(&input.vm_input.arguments[2])?;
    held.value += value;
    world
        .accounts
        .get_or_create_account(&input.vm_input.caller_addr)
        .set_esdt_token(&token, nonce, &held)?;
    Ok(VmOutput::default())
}

pub(crate) fn esdt_nft_burn(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    require_self_call(input)?;
    let arguments = &input.vm_input.arguments;
    if arguments.len() != 3 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let token = &arguments[0];
    let nonce = bytes_to_nonce(&arguments[1]);
    let caller = &input.vm_input.caller_addr;
    require_role(world, caller, token, roles::NFT_BURN)?;
    let value = positive_value(&arguments[2])?;
    burn(world, caller, token, nonce, &value)?;
    Ok(VmOutput::default())
}

pub(crate) fn esdt_nft_add_uri(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    let (token, nonce, mut held) = caller_nft(world, input, roles::NFT_ADD_URI, 3)?;
    let metadata = held
        .metadata
        .as_mut()
        .ok_or_else(|| reject("NFT does not have metadata"))?;
    metadata
        .uris
        .extend(input.vm_input.arguments[2..].iter().cloned());
    world
        .accounts
        .get_or_create_account(&input.vm_input.caller_addr)
        .set_esdt_token(&token, nonce, &held)?;
    Ok(VmOutput::default())
}

pub(crate) fn esdt_nft_update_attributes(world: &mut World, input: &ContractCallInput) -> BuiltinResult {
    let (token, nonce, mut held) = caller_nft(world, input, roles::NFT_UPDATE_ATTRIBUTES, 3)?;
    let metadata = held
        .metadata
        .as_mut()
        .ok_or_else(|| reject("NFT does not have metadata"))?;
    metadata.attributes = input.vm_input.arguments[2].clone();
    world
        .accounts
        .get_or_create_account(&input.vm_input.caller_addr)
        .set_esdt_token(&token, nonce, &held)?;
    Ok(VmOutput::default())
}

/// `ESDTSetRole` when `grant`, `ESDTUnSetRole` otherwise
pub(crate) fn esdt_set_role(world: &mut World, input: &ContractCallInput, grant: bool) -> BuiltinResult {
    if input.vm_input.caller_addr.as_slice() != ESDT_SYSTEM_SC_ADDRESS.as_slice() {
        return Err(reject("caller is not the ESDT system smart contract"));
    }
    let arguments = &input.vm_input.arguments;
    if arguments.len() < 2 {
        return Err(reject(ERR_INVALID_ARGUMENTS));
    }
    let token = &arguments[0];
    let account = world.accounts.get_or_create_account(&input.recipient_addr);
    let mut held_roles = account.esdt_roles(token)?;
    for role in &arguments[1..] {
        if grant {
            if !held_roles.contains(role) {
                held_roles.push(role.clone());
            }
        } else {
            held_roles.retain(|held| held != role);
        }
    }
    account.set_esdt_roles(token, &held_roles)?;
    Ok(VmOutput::default())
}
