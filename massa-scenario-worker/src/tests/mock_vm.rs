// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::{BigInt, BigUint};

use massa_scenario_exports::test_exports::{MockVmInterface, PreparedVmBuilder};
use massa_scenario_exports::ScenarioConfig;
use massa_scenario_models::vm::{LogEntry, ReturnCode, StorageUpdate, VmOutput};
use massa_scenario_test_framework::{ScenarioDir, TestUniverse};

use super::{address, sc_address, ExecutorTestUniverse};

const SETUP: &str = r#"{
    "step": "setState",
    "accounts": {
        "address:a": { "nonce": "0", "balance": "100" },
        "sc:counter": { "code": "0x0102", "owner": "address:a", "storage": { "str:count": "1" } }
    }
}"#;

fn universe_with(vm: MockVmInterface) -> ExecutorTestUniverse {
    ExecutorTestUniverse::new(
        Box::new(PreparedVmBuilder::new(Box::new(vm))),
        ScenarioConfig::default(),
    )
}

fn mock_vm() -> MockVmInterface {
    let mut vm = MockVmInterface::new();
    vm.expect_set_gas_tracing().return_const(());
    vm
}

fn call_scenario(dir: &ScenarioDir, call: &str) -> std::path::PathBuf {
    dir.write(
        "call.scen.json",
        &format!(r#"{{"name": "call", "steps": [{}, {}]}}"#, SETUP, call),
    )
}

#[test]
fn test_balance_deltas_must_sum_to_value() {
    let mut vm = mock_vm();
    vm.expect_run_smart_contract_call()
        .times(1)
        .returning(|_world, input| {
            let mut output = VmOutput::default();
            output.output_account_mut(&input.recipient_addr).balance_delta = BigInt::from(3);
            Ok(output)
        });
    let mut universe = universe_with(vm);
    let dir = ScenarioDir::new();
    let path = call_scenario(
        &dir,
        r#"{
            "step": "scCall",
            "id": "pay",
            "tx": { "from": "address:a", "to": "sc:counter", "function": "pay", "egldValue": "10", "gasLimit": "100", "gasPrice": "0" }
        }"#,
    );
    let err = universe.run(&path).unwrap_err();
    assert_eq!(
        err.to_string(),
        "sum of balance deltas should equal call value. Sum of balance deltas: 3 (0x3). Call value: 10 (0xa)"
    );

    // the sender nonce is spent before the tx runs, the payment is rolled back
    let world = universe.get_module_controller().world();
    let sender = world.account(&address("a")).unwrap();
    assert_eq!(sender.nonce, 1);
    assert_eq!(sender.balance, BigUint::from(100u32));
    assert_eq!(
        world.account(&sc_address("counter")).unwrap().balance,
        BigUint::default()
    );
}

#[test]
fn test_failed_call_rolls_back_world_changes() {
    let mut vm = mock_vm();
    vm.expect_run_smart_contract_call()
        .times(1)
        .returning(|world, input| {
            let contract = world.account_mut(&input.recipient_addr).unwrap();
            contract.save_key_value(b"count".to_vec(), vec![2]);
            contract.balance = BigUint::from(1_000u32);
            Ok(VmOutput::failure(ReturnCode::UserError, "counter is locked"))
        });
    let mut universe = universe_with(vm);
    let dir = ScenarioDir::new();
    let path = dir.write(
        "call.scen.json",
        &format!(
            r#"{{"name": "call", "steps": [{}, {}, {}]}}"#,
            SETUP,
            r#"{
                "step": "scCall",
                "id": "increment",
                "tx": { "from": "address:a", "to": "sc:counter", "function": "increment", "gasLimit": "100", "gasPrice": "0" },
                "expect": { "status": "4", "message": "str:counter is locked" }
            }"#,
            r#"{
                "step": "checkState",
                "accounts": {
                    "address:a": { "nonce": "1", "balance": "100" },
                    "sc:counter": { "balance": "0", "storage": { "str:count": "1" } }
                }
            }"#
        ),
    );
    universe.run(&path).unwrap();
}

#[test]
fn test_successful_call_applies_output() {
    let mut vm = mock_vm();
    vm.expect_run_smart_contract_call()
        .times(1)
        .returning(|_world, input| {
            let mut output = VmOutput {
                return_data: vec![vec![2]],
                gas_remaining: 40,
                ..Default::default()
            };
            let contract = output.output_account_mut(&input.recipient_addr);
            contract.balance_delta = BigInt::from(input.vm_input.call_value.clone());
            contract.storage_updates.push(StorageUpdate {
                offset: b"count".to_vec(),
                data: vec![2],
            });
            Ok(output)
        });
    let mut universe = universe_with(vm);
    let dir = ScenarioDir::new();
    let path = dir.write(
        "call.scen.json",
        &format!(
            r#"{{"name": "call", "steps": [{}, {}, {}]}}"#,
            SETUP,
            r#"{
                "step": "scCall",
                "id": "increment",
                "tx": { "from": "address:a", "to": "sc:counter", "function": "increment", "egldValue": "5", "gasLimit": "100", "gasPrice": "0" },
                "expect": { "out": ["2"], "status": "0", "gas": "40", "refund": "*", "logs": [] }
            }"#,
            r#"{
                "step": "checkState",
                "accounts": {
                    "address:a": { "nonce": "1", "balance": "95" },
                    "sc:counter": { "balance": "5", "code": "0x0102", "storage": { "str:count": "2" } }
                }
            }"#
        ),
    );
    universe.run(&path).unwrap();
}

#[test]
fn test_out_mismatch_message() {
    let mut vm = mock_vm();
    vm.expect_run_smart_contract_call()
        .times(1)
        .returning(|_world, _input| {
            Ok(VmOutput {
                return_data: vec![b"x".to_vec()],
                ..Default::default()
            })
        });
    let mut universe = universe_with(vm);
    let dir = ScenarioDir::new();
    let path = call_scenario(
        &dir,
        r#"{
            "step": "scCall",
            "id": "get",
            "tx": { "from": "address:a", "to": "sc:counter", "function": "get", "gasLimit": "100", "gasPrice": "0" },
            "expect": { "out": ["1"] }
        }"#,
    );
    let err = universe.run(&path).unwrap_err();
    assert_eq!(
        err.to_string(),
        "result mismatch. Tx get. Want: [\"1\"]. Have: [\"0x78 (str:x)\"]"
    );
}

#[test]
fn test_logs_are_compared() {
    let mut vm = mock_vm();
    vm.expect_run_smart_contract_call()
        .times(1)
        .returning(|_world, input| {
            let mut output = VmOutput::default();
            output.logs.push(LogEntry {
                identifier: b"incremented".to_vec(),
                address: input.recipient_addr.clone(),
                topics: vec![b"count".to_vec()],
                data: vec![],
            });
            Ok(output)
        });
    let mut universe = universe_with(vm);
    let dir = ScenarioDir::new();
    let path = call_scenario(
        &dir,
        r#"{
            "step": "scCall",
            "id": "increment",
            "tx": { "from": "address:a", "to": "sc:counter", "function": "increment", "gasLimit": "100", "gasPrice": "0" },
            "expect": {
                "logs": [{ "address": "sc:counter", "identifier": "str:decremented", "topics": ["str:count"], "data": [] }]
            }
        }"#,
    );
    let err = universe.run(&path).unwrap_err();
    assert_eq!(
        err.to_string(),
        "bad log identifier. Tx increment. Log index: 0. Want: str:decremented. Have: str:incremented"
    );
}
