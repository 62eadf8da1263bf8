// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::collections::BTreeMap;

use num::BigUint;
use strum::IntoEnumIterator;

use massa_scenario_models::address::ESDT_SYSTEM_SC_ADDRESS;
use massa_scenario_models::vm::{
    ContractCallInput, EsdtTokenType, EsdtTransfer, GasScheduleMap, ReturnCode, VmInput,
};

use super::*;
use crate::account::Account;
use crate::esdt::{roles, EsdtToken};

fn address(name: &[u8]) -> Vec<u8> {
    let mut address = name.to_vec();
    address.resize(32, b'_');
    address
}

fn gas_schedule() -> GasScheduleMap {
    let costs = BuiltinFunction::iter()
        .map(|function| (function.to_string(), 1u64))
        .collect();
    let mut schedule = BTreeMap::new();
    schedule.insert(crate::world::BUILTIN_COST_SECTION.to_string(), costs);
    schedule
}

fn world_with_tokens(holder: &[u8], token: &[u8], amount: u32) -> World {
    let mut world = World::new(vec![0, 0]);
    world.init_builtin_functions(&gas_schedule());
    let mut account = Account::new(address(holder));
    account
        .set_esdt_token(token, 0, &EsdtToken::fungible(BigUint::from(amount)))
        .unwrap();
    world.accept_account(account);
    world
}

fn call(caller: &[u8], recipient: &[u8], function: &str, arguments: Vec<Vec<u8>>) -> ContractCallInput {
    ContractCallInput {
        vm_input: VmInput {
            caller_addr: caller.to_vec(),
            arguments,
            gas_provided: 10,
            ..Default::default()
        },
        recipient_addr: recipient.to_vec(),
        function: function.to_string(),
    }
}

#[test]
fn test_esdt_transfer_moves_tokens() {
    let mut world = world_with_tokens(b"a", b"TOK-123456", 100);
    let input = call(
        &address(b"a"),
        &address(b"b"),
        "ESDTTransfer",
        vec![b"TOK-123456".to_vec(), vec![100]],
    );
    let output = world.process_builtin_function(&input).unwrap();
    assert_eq!(output.return_code, ReturnCode::Ok);
    assert_eq!(output.gas_remaining, 9);
    assert_eq!(output.logs.len(), 1);
    let sender = world.account(&address(b"a")).unwrap();
    assert!(sender.storage.is_empty());
    let receiver = world.account(&address(b"b")).unwrap();
    assert_eq!(
        receiver.esdt_balance(b"TOK-123456", 0).unwrap(),
        BigUint::from(100u32)
    );
}

#[test]
fn test_esdt_transfer_insufficient_funds_is_a_return_code() {
    let mut world = world_with_tokens(b"a", b"TOK-123456", 5);
    let input = call(
        &address(b"a"),
        &address(b"b"),
        "ESDTTransfer",
        vec![b"TOK-123456".to_vec(), vec![6]],
    );
    let output = world.process_builtin_function(&input).unwrap();
    assert_eq!(output.return_code, ReturnCode::UserError);
    assert_eq!(output.return_message, "insufficient funds");
    assert!(world.account(&address(b"b")).is_none());
}

#[test]
fn test_out_of_gas() {
    let mut world = world_with_tokens(b"a", b"TOK-123456", 5);
    let mut input = call(
        &address(b"a"),
        &address(b"b"),
        "ESDTTransfer",
        vec![b"TOK-123456".to_vec(), vec![1]],
    );
    input.vm_input.gas_provided = 0;
    let output = world.process_builtin_function(&input).unwrap();
    assert_eq!(output.return_code, ReturnCode::OutOfGas);
}

#[test]
fn test_bridge_errors() {
    let mut world = World::new(vec![0, 0]);
    let input = call(&address(b"a"), &address(b"a"), "ESDTTransfer", vec![]);
    assert_eq!(
        world.process_builtin_function(&input),
        Err(WorldError::BuiltinFunctionsNotInitialized)
    );
    world.init_builtin_functions(&gas_schedule());
    let input = call(&address(b"a"), &address(b"a"), "notBuiltin", vec![]);
    assert_eq!(
        world.process_builtin_function(&input).unwrap_err().to_string(),
        "function not found: notBuiltin"
    );
    assert!(is_builtin_function("MultiESDTNFTTransfer"));
    assert!(!is_builtin_function("transfer"));
}

#[test]
fn test_convert_single_fungible() {
    let mut input = call(&address(b"a"), &address(b"sc"), "deposit", vec![vec![7]]);
    input.vm_input.esdt_transfers.push(EsdtTransfer {
        token_identifier: b"TOK-123456".to_vec(),
        token_nonce: 0,
        value: BigUint::from(300u32),
        token_type: EsdtTokenType::Fungible,
    });
    let converted = convert_to_builtin_function(&input);
    assert_eq!(converted.function, "ESDTTransfer");
    assert_eq!(converted.recipient_addr, address(b"sc"));
    assert_eq!(
        converted.vm_input.arguments,
        vec![b"TOK-123456".to_vec(), vec![1, 44], b"deposit".to_vec(), vec![7]]
    );
}

#[test]
fn test_convert_single_nft_and_multi() {
    let nft = EsdtTransfer {
        token_identifier: b"NFT-123456".to_vec(),
        token_nonce: 2,
        value: BigUint::from(1u32),
        token_type: EsdtTokenType::NonFungible,
    };
    let mut input = call(&address(b"a"), &address(b"b"), "", vec![]);
    input.vm_input.esdt_transfers.push(nft.clone());
    let converted = convert_to_builtin_function(&input);
    assert_eq!(converted.function, "ESDTNFTTransfer");
    assert_eq!(converted.recipient_addr, address(b"a"));
    assert_eq!(
        converted.vm_input.arguments,
        vec![b"NFT-123456".to_vec(), vec![2], vec![1], address(b"b")]
    );

    input.vm_input.esdt_transfers.push(EsdtTransfer {
        token_identifier: b"EGLD-000000".to_vec(),
        token_nonce: 0,
        value: BigUint::from(5u32),
        token_type: EsdtTokenType::Fungible,
    });
    let converted = convert_to_builtin_function(&input);
    assert_eq!(converted.function, "MultiESDTNFTTransfer");
    assert_eq!(converted.vm_input.arguments[0], address(b"b"));
    assert_eq!(converted.vm_input.arguments[1], vec![2]);
    assert_eq!(converted.vm_input.arguments.len(), 8);
}

#[test]
fn test_multi_transfer_with_egld() {
    let mut world = world_with_tokens(b"a", b"TOK-123456", 10);
    world.account_mut(&address(b"a")).unwrap().balance = BigUint::from(50u32);
    let input = call(
        &address(b"a"),
        &address(b"a"),
        "MultiESDTNFTTransfer",
        vec![
            address(b"b"),
            vec![2],
            b"TOK-123456".to_vec(),
            vec![],
            vec![4],
            b"EGLD-000000".to_vec(),
            vec![],
            vec![20],
        ],
    );
    let output = world.process_builtin_function(&input).unwrap();
    assert_eq!(output.return_code, ReturnCode::Ok);
    let sender = world.account(&address(b"a")).unwrap();
    assert_eq!(sender.balance, BigUint::from(30u32));
    assert_eq!(sender.esdt_balance(b"TOK-123456", 0).unwrap(), BigUint::from(6u32));
    let receiver = world.account(&address(b"b")).unwrap();
    assert_eq!(receiver.balance, BigUint::from(20u32));
    assert_eq!(receiver.esdt_balance(b"TOK-123456", 0).unwrap(), BigUint::from(4u32));
}

#[test]
fn test_roles_gate_nft_create() {
    let mut world = World::new(vec![0, 0]);
    world.init_builtin_functions(&gas_schedule());
    world.accept_account(Account::new(address(b"creator")));
    let create = call(
        &address(b"creator"),
        &address(b"creator"),
        "ESDTNFTCreate",
        vec![
            b"NFT-123456".to_vec(),
            vec![1],
            b"name".to_vec(),
            vec![0x03, 0xe8],
            b"hash".to_vec(),
            b"attributes".to_vec(),
            b"www.cool.nft".to_vec(),
        ],
    );
    let output = world.process_builtin_function(&create).unwrap();
    assert_eq!(output.return_message, "action is not allowed");

    let set_role = call(
        &ESDT_SYSTEM_SC_ADDRESS,
        &address(b"creator"),
        "ESDTSetRole",
        vec![b"NFT-123456".to_vec(), roles::NFT_CREATE.to_vec()],
    );
    let output = world.process_builtin_function(&set_role).unwrap();
    assert_eq!(output.return_code, ReturnCode::Ok);

    let output = world.process_builtin_function(&create).unwrap();
    assert_eq!(output.return_code, ReturnCode::Ok);
    assert_eq!(output.return_data, vec![vec![1]]);
    let creator = world.account(&address(b"creator")).unwrap();
    assert_eq!(creator.esdt_last_nonce(b"NFT-123456"), 1);
    let created = creator.esdt_token(b"NFT-123456", 1).unwrap().unwrap();
    let metadata = created.metadata.unwrap();
    assert_eq!(metadata.royalties, 1000);
    assert_eq!(metadata.creator, address(b"creator"));
    assert_eq!(metadata.uris, vec![b"www.cool.nft".to_vec()]);
}

#[test]
fn test_set_role_requires_system_contract() {
    let mut world = World::new(vec![0, 0]);
    world.init_builtin_functions(&gas_schedule());
    let input = call(
        &address(b"someone"),
        &address(b"target"),
        "ESDTSetRole",
        vec![b"TOK-123456".to_vec(), roles::LOCAL_MINT.to_vec()],
    );
    let output = world.process_builtin_function(&input).unwrap();
    assert_eq!(output.return_code, ReturnCode::UserError);
    assert!(world.account(&address(b"target")).is_none());
}

#[test]
fn test_save_key_value_protects_reserved_keys() {
    let mut world = World::new(vec![0, 0]);
    world.init_builtin_functions(&gas_schedule());
    let input = call(
        &address(b"a"),
        &address(b"a"),
        "SaveKeyValue",
        vec![b"ELRONDreward".to_vec(), vec![1]],
    );
    let output = world.process_builtin_function(&input).unwrap();
    assert_eq!(output.return_message, "operation not permitted");

    let input = call(&address(b"a"), &address(b"a"), "SaveKeyValue", vec![b"k".to_vec(), b"v".to_vec()]);
    world.process_builtin_function(&input).unwrap();
    assert_eq!(world.account(&address(b"a")).unwrap().storage_value(b"k"), b"v".to_vec());
}

#[test]
fn test_multi_transfer_rejects_bad_counts() {
    let mut world = world_with_tokens(b"a", b"TOK-123456", 10);
    let transfer = |count: Vec<u8>| {
        call(
            &address(b"a"),
            &address(b"a"),
            "MultiESDTNFTTransfer",
            vec![address(b"b"), count, b"TOK-123456".to_vec(), vec![], vec![1]],
        )
    };
    for count in [
        vec![0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x56],
        vec![0xff; 8],
        vec![1, 0, 0, 0, 0, 0, 0, 0, 1],
        vec![2],
        vec![],
    ] {
        let output = world.process_builtin_function(&transfer(count)).unwrap();
        assert_eq!(output.return_code, ReturnCode::UserError);
        assert_eq!(output.return_message, ERR_INVALID_ARGUMENTS);
    }
    assert!(world.account(&address(b"b")).is_none());

    let output = world.process_builtin_function(&transfer(vec![1])).unwrap();
    assert_eq!(output.return_code, ReturnCode::Ok);
    assert_eq!(
        world.account(&address(b"b")).unwrap().esdt_balance(b"TOK-123456", 0).unwrap(),
        BigUint::from(1u32)
    );
}

#[test]
fn test_short_argument_lists_are_rejected() {
    let mut world = world_with_tokens(b"a", b"TOK-123456", 10);
    for (function, arguments) in [
        ("ESDTTransfer", vec![b"TOK-123456".to_vec()]),
        ("ESDTNFTTransfer", vec![b"TOK-123456".to_vec(), vec![1]]),
        ("MultiESDTNFTTransfer", vec![address(b"b")]),
        ("ESDTLocalMint", vec![b"TOK-123456".to_vec()]),
        ("ESDTNFTCreate", vec![b"TOK-123456".to_vec(), vec![1]]),
    ] {
        let input = call(&address(b"a"), &address(b"a"), function, arguments);
        let output = world.process_builtin_function(&input).unwrap();
        assert_ne!(output.return_code, ReturnCode::Ok, "{} accepted", function);
    }
}

#[test]
fn test_nft_create_without_nonce_left() {
    let mut world = World::new(vec![0, 0]);
    world.init_builtin_functions(&gas_schedule());
    let mut creator = Account::new(address(b"creator"));
    creator
        .set_esdt_roles(b"NFT-123456", &[roles::NFT_CREATE.to_vec()])
        .unwrap();
    creator.set_esdt_last_nonce(b"NFT-123456", u64::MAX);
    world.accept_account(creator);
    let create = call(
        &address(b"creator"),
        &address(b"creator"),
        "ESDTNFTCreate",
        vec![
            b"NFT-123456".to_vec(),
            vec![1],
            b"name".to_vec(),
            vec![],
            b"hash".to_vec(),
            b"attributes".to_vec(),
            b"www.cool.nft".to_vec(),
        ],
    );
    let output = world.process_builtin_function(&create).unwrap();
    assert_eq!(output.return_code, ReturnCode::UserError);
    assert_eq!(
        output.return_message,
        "invalid arguments, no nonce left for the token"
    );
    let creator = world.account(&address(b"creator")).unwrap();
    assert_eq!(creator.esdt_last_nonce(b"NFT-123456"), u64::MAX);
}
