// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::BigUint;

use massa_scenario_models::vm::ContractCallInput;

use crate::esdt::{nonce_to_bytes, EGLD_TOKEN_IDENTIFIER};

use super::BuiltinFunction;

pub(crate) fn biguint_to_bytes(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

/// Rewrites a call carrying ESDT transfers into the builtin function that
/// performs them.
///
/// A single fungible transfer becomes `ESDTTransfer` to the recipient, a
/// single NFT transfer becomes `ESDTNFTTransfer` and anything else
/// `MultiESDTNFTTransfer`; the last two are sent by the caller to itself
/// with the real destination as argument. The original function and its
/// arguments are appended so the receiving contract can still be called.
pub fn convert_to_builtin_function(input: &ContractCallInput) -> ContractCallInput {
    let transfers = &input.vm_input.esdt_transfers;
    if transfers.is_empty() {
        return input.clone();
    }
    let mut converted = input.clone();
    converted.vm_input.call_value = BigUint::default();

    let mut arguments = Vec::new();
    match transfers.as_slice() {
        [transfer] if transfer.token_identifier != EGLD_TOKEN_IDENTIFIER => {
            if transfer.token_nonce == 0 {
                converted.function = BuiltinFunction::EsdtTransfer.to_string();
                arguments.push(transfer.token_identifier.clone());
                arguments.push(biguint_to_bytes(&transfer.value));
            } else {
                converted.function = BuiltinFunction::EsdtNftTransfer.to_string();
                converted.recipient_addr = input.vm_input.caller_addr.clone();
                arguments.push(transfer.token_identifier.clone());
                arguments.push(nonce_to_bytes(transfer.token_nonce));
                arguments.push(biguint_to_bytes(&transfer.value));
                arguments.push(input.recipient_addr.clone());
            }
        }
        _ => {
            converted.function = BuiltinFunction::MultiEsdtNftTransfer.to_string();
            converted.recipient_addr = input.vm_input.caller_addr.clone();
            arguments.push(input.recipient_addr.clone());
            arguments.push(nonce_to_bytes(transfers.len() as u64));
            for transfer in transfers {
                arguments.push(transfer.token_identifier.clone());
                arguments.push(nonce_to_bytes(transfer.token_nonce));
                arguments.push(biguint_to_bytes(&transfer.value));
            }
        }
    }
    if !input.function.is_empty() {
        arguments.push(input.function.as_bytes().to_vec());
        arguments.extend(input.vm_input.arguments.iter().cloned());
    }
    converted.vm_input.arguments = arguments;
    converted
}
