// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::BigUint;

use massa_scenario_exports::FileResolver;

use massa_scenario_models::account::{CheckEsdt, CheckStorage};
use massa_scenario_models::scenario::{GasSchedule, Step};
use massa_scenario_models::transaction::{CheckLogs, TransactionType};

use crate::{DefaultFileResolver, Parser};

fn parser() -> Parser {
    Parser::new(vec![5, 0], Box::new(DefaultFileResolver::new()))
}

fn padded(name: &[u8]) -> Vec<u8> {
    let mut address = name.to_vec();
    address.resize(32, b'_');
    address
}

const SCENARIO: &str = r#"{
    "name": "transfer",
    "gasSchedule": "dummy",
    "checkGas": false,
    "steps": [
        {
            "step": "setState",
            "accounts": {
                "address:a": {
                    "nonce": "0",
                    "balance": "100",
                    "esdt": {
                        "str:TOK-123456": "500",
                        "str:NFT-123456": {
                            "instances": [
                                { "nonce": "1", "balance": "1", "royalties": "1000", "uri": "str:www.nft" }
                            ],
                            "lastNonce": "1",
                            "roles": ["ESDTRoleNFTCreate"]
                        }
                    },
                    "storage": { "str:key": "str:value" }
                }
            },
            "newAddresses": [
                { "creatorAddress": "address:a", "creatorNonce": "0", "newAddress": "sc:adder" }
            ],
            "currentBlockInfo": { "blockNonce": "7", "blockRound": "" }
        },
        {
            "step": "transfer",
            "id": "tx-1",
            "tx": { "from": "address:a", "to": "address:b", "egldValue": "30" }
        },
        {
            "step": "scCall",
            "txId": "call-1",
            "displayLogs": true,
            "tx": {
                "from": "address:a",
                "to": "sc:adder",
                "function": "add",
                "arguments": ["5", ["u8:1", "u8:2"]],
                "gasLimit": "5,000,000",
                "gasPrice": "0"
            },
            "expect": {
                "out": ["*"],
                "status": "0",
                "logs": [{ "address": "sc:adder", "identifier": "str:added", "topics": [], "data": "" }, "+"],
                "gas": "*",
                "refund": "*"
            }
        },
        {
            "step": "checkState",
            "id": "check-1",
            "accounts": {
                "address:a": {
                    "nonce": "*",
                    "balance": "70",
                    "storage": { "str:key": "str:value", "+": "" },
                    "esdt": "*"
                },
                "+": ""
            }
        },
        { "step": "externalSteps", "path": "../init.steps.json", "traceGas": true },
        { "step": "dumpState" }
    ]
}"#;

#[test]
fn test_parse_full_scenario() {
    let scenario = parser().parse_scenario_file(SCENARIO.as_bytes()).unwrap();
    assert_eq!(scenario.name, "transfer");
    assert_eq!(scenario.gas_schedule, GasSchedule::Dummy);
    assert!(!scenario.check_gas);
    assert_eq!(scenario.steps.len(), 6);

    let Step::SetState(set_state) = &scenario.steps[0] else {
        panic!("expected setState");
    };
    let account = &set_state.accounts[0];
    assert_eq!(account.address.value, padded(b"a"));
    assert_eq!(account.balance.as_ref().unwrap().value, BigUint::from(100u32));
    assert_eq!(account.esdt.len(), 2);
    assert_eq!(account.esdt[0].token_identifier.value, b"TOK-123456".to_vec());
    assert_eq!(account.esdt[0].instances[0].balance.value, BigUint::from(500u32));
    let nft = &account.esdt[1];
    assert_eq!(nft.instances[0].nonce.value, 1);
    assert_eq!(nft.instances[0].uris[0].value, b"www.nft".to_vec());
    assert_eq!(nft.roles, vec!["ESDTRoleNFTCreate".to_string()]);
    assert_eq!(account.storage[0].value.value, b"value".to_vec());
    assert_eq!(set_state.new_address_mocks.len(), 1);
    let block_info = set_state.current_block_info.as_ref().unwrap();
    assert_eq!(block_info.block_nonce.as_ref().unwrap().value, 7);
    assert!(block_info.block_round.is_none());

    let Step::Tx(transfer) = &scenario.steps[1] else {
        panic!("expected transfer");
    };
    assert_eq!(transfer.tx_ident, "tx-1");
    assert_eq!(transfer.tx.tx_type, TransactionType::Transfer);
    assert_eq!(transfer.tx.egld_value.value, BigUint::from(30u32));
    assert!(transfer.expected_result.is_none());

    let Step::Tx(call) = &scenario.steps[2] else {
        panic!("expected scCall");
    };
    assert_eq!(call.tx_ident, "call-1");
    assert!(call.display_logs);
    assert_eq!(call.tx.arguments[0].value, vec![5]);
    assert_eq!(call.tx.arguments[1].value, vec![1, 2]);
    assert_eq!(call.tx.gas_limit.value, 5_000_000);
    let expected = call.expected_result.as_ref().unwrap();
    assert!(expected.gas.is_star());
    assert!(expected.message.check(b"".as_slice()));
    let CheckLogs::List { entries, more_allowed_at_end } = &expected.logs else {
        panic!("expected log list");
    };
    assert!(more_allowed_at_end);
    assert!(entries[0].endpoint.check(b"added".as_slice()));
    assert!(entries[0].data.check_list(&[]));

    let Step::CheckState(check) = &scenario.steps[3] else {
        panic!("expected checkState");
    };
    assert_eq!(check.check_state_ident, "check-1");
    assert!(check.check_accounts.more_accounts_allowed);
    let checked = &check.check_accounts.accounts[0];
    assert!(checked.nonce.is_star());
    assert_eq!(checked.esdt, CheckEsdt::Ignore);
    assert!(matches!(
        checked.storage,
        CheckStorage::Entries { more_allowed: true, .. }
    ));

    let Step::ExternalSteps(external) = &scenario.steps[4] else {
        panic!("expected externalSteps");
    };
    assert_eq!(external.path, "../init.steps.json");
    assert_eq!(external.trace_gas, Some(true));
    assert!(matches!(scenario.steps[5], Step::DumpState(_)));
}

#[test]
fn test_unspecified_expect_defaults_to_success() {
    let scenario = parser()
        .parse_scenario_file(
            br#"{"steps": [{"step": "scCall", "tx": {"from": "address:a", "to": "sc:x", "function": "f"}, "expect": {}}]}"#,
        )
        .unwrap();
    let Step::Tx(step) = &scenario.steps[0] else {
        panic!("expected tx");
    };
    let expected = step.expected_result.as_ref().unwrap();
    assert!(expected.status.check(&BigUint::default()));
    assert!(!expected.status.check(&BigUint::from(4u32)));
    assert!(expected.out.is_unspecified());
    assert!(scenario.check_gas);
}

#[test]
fn test_parse_errors() {
    let cases: [(&str, &str); 8] = [
        (
            r#"{"steps": [{"step": "setState", "accounts": {"str:short": {}}}]}"#,
            "error processing steps: cannot parse set state step: account address is not 32 bytes in length",
        ),
        (
            r#"{"steps": [{"step": "teleport"}]}"#,
            "error processing steps: unknown step type: teleport",
        ),
        (
            r#"{"steps": [{"step": "dumpState", "accounts": {}}]}"#,
            "error processing steps: unknown step field: accounts",
        ),
        (
            r#"{"steps": [{"step": "setState", "accounts": {"address:a": {"colour": "red"}}}]}"#,
            "error processing steps: cannot parse set state step: unknown account field: colour",
        ),
        (
            r#"{"steps": [{"step": "validatorReward", "tx": {"from": "address:a"}}]}"#,
            "error processing steps: cannot parse tx step: `from` not allowed in transaction, it is always the zero address",
        ),
        (
            r#"{"steps": [{"step": "scDeploy", "tx": {"to": "address:a"}}]}"#,
            "error processing steps: cannot parse tx step: transaction to field not allowed for scDeploy transactions",
        ),
        (
            r#"{"steps": [{"step": "transfer", "tx": {"to": "address:a", "color": "blue"}}]}"#,
            "error processing steps: cannot parse tx step: unknown field in transaction: color",
        ),
        (
            r#"{"steps": [{"step": "scCall", "tx": {"to": "address:a"}, "expect": {"colour": ""}}]}"#,
            "error processing steps: cannot parse tx step: cannot parse tx expected result: unknown tx expected result field: colour",
        ),
    ];
    for (json, message) in cases {
        let err = parser().parse_scenario_file(json.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), message, "{}", json);
    }
}

#[test]
fn test_file_values_use_scenario_context() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("adder.wasm"), b"code").unwrap();
    let mut parser = parser();
    parser
        .file_resolver_mut()
        .set_context(&dir.path().join("deploy.scen.json"));
    let scenario = parser
        .parse_scenario_file(
            br#"{"steps": [{"step": "scDeploy", "tx": {"from": "address:a", "contractCode": "file:adder.wasm"}}]}"#,
        )
        .unwrap();
    let Step::Tx(deploy) = &scenario.steps[0] else {
        panic!("expected deploy");
    };
    assert_eq!(deploy.tx.code.value, b"code".to_vec());
    assert_eq!(deploy.tx.code.original_str(), "file:adder.wasm");
}
