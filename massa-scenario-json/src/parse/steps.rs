// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::str::FromStr;

use serde_json::{Map, Value};

use massa_scenario_exports::ScenarioError;
use massa_scenario_models::scenario::{
    CheckStateStep, DumpStateStep, ExternalStepsStep, SetStateStep, Step, TxStep,
};
use massa_scenario_models::transaction::TransactionType;

use super::value::{context, parse_bool, parse_string};
use super::{parse_error, Parser};

const STEP_SET_STATE: &str = "setState";
const STEP_CHECK_STATE: &str = "checkState";
const STEP_EXTERNAL_STEPS: &str = "externalSteps";
const STEP_DUMP_STATE: &str = "dumpState";

/// Fields every step may carry
fn is_common_field(key: &str) -> bool {
    matches!(key, "step" | "id" | "comment")
}

fn step_comment(fields: &Map<String, Value>) -> Result<String, ScenarioError> {
    match fields.get("comment") {
        Some(comment) => parse_string(comment).map_err(context("bad step comment")),
        None => Ok(String::new()),
    }
}

fn unknown_field(key: &str) -> ScenarioError {
    parse_error(format!("unknown step field: {}", key))
}

impl Parser {
    pub(super) fn process_steps(&self, value: &Value) -> Result<Vec<Step>, ScenarioError> {
        let steps = value
            .as_array()
            .ok_or_else(|| parse_error("steps not a JSON list".to_string()))?;
        steps.iter().map(|step| self.process_step(step)).collect()
    }

    fn process_step(&self, value: &Value) -> Result<Step, ScenarioError> {
        let fields = value
            .as_object()
            .ok_or_else(|| parse_error("step is not a map".to_string()))?;
        let step_type = fields
            .get("step")
            .ok_or_else(|| parse_error("step type not specified".to_string()))
            .and_then(|value| parse_string(value).map_err(context("bad step type")))?;

        match step_type.as_str() {
            STEP_SET_STATE => Ok(Step::SetState(
                self.process_set_state_step(fields)
                    .map_err(context("cannot parse set state step"))?,
            )),
            STEP_CHECK_STATE => Ok(Step::CheckState(
                self.process_check_state_step(fields)
                    .map_err(context("cannot parse check state step"))?,
            )),
            STEP_EXTERNAL_STEPS => Ok(Step::ExternalSteps(
                process_external_steps_step(fields)
                    .map_err(context("cannot parse external steps step"))?,
            )),
            STEP_DUMP_STATE => {
                if let Some(key) = fields.keys().find(|key| !is_common_field(key)) {
                    return Err(unknown_field(key));
                }
                Ok(Step::DumpState(DumpStateStep {
                    comment: step_comment(fields)?,
                }))
            }
            other => match TransactionType::from_str(other) {
                Ok(tx_type) => Ok(Step::Tx(
                    self.process_tx_step(tx_type, fields)
                        .map_err(context("cannot parse tx step"))?,
                )),
                Err(_) => Err(parse_error(format!("unknown step type: {}", other))),
            },
        }
    }

    fn process_set_state_step(
        &self,
        fields: &Map<String, Value>,
    ) -> Result<SetStateStep, ScenarioError> {
        let mut step = SetStateStep {
            comment: step_comment(fields)?,
            ..Default::default()
        };
        for (key, value) in fields {
            match key.as_str() {
                "accounts" => {
                    step.accounts = self.process_accounts(value)?
                }
                "newAddresses" => {
                    step.new_address_mocks = self
                        .process_new_addresses(value)
                        .map_err(context("error parsing new addresses"))?
                }
                "previousBlockInfo" => {
                    step.previous_block_info = Some(
                        self.process_block_info(value)
                            .map_err(context("error parsing previousBlockInfo"))?,
                    )
                }
                "currentBlockInfo" => {
                    step.current_block_info = Some(
                        self.process_block_info(value)
                            .map_err(context("error parsing currentBlockInfo"))?,
                    )
                }
                "blockHashes" => {
                    step.block_hashes = self
                        .sub_tree_list(value)
                        .map_err(context("error parsing block hashes"))?
                }
                key if is_common_field(key) => {}
                _ => return Err(unknown_field(key)),
            }
        }
        Ok(step)
    }

    fn process_check_state_step(
        &self,
        fields: &Map<String, Value>,
    ) -> Result<CheckStateStep, ScenarioError> {
        let mut step = CheckStateStep {
            comment: step_comment(fields)?,
            ..Default::default()
        };
        for (key, value) in fields {
            match key.as_str() {
                "id" => step.check_state_ident = parse_string(value).map_err(context("bad check state id"))?,
                "accounts" => {
                    step.check_accounts = self
                        .process_check_accounts(value)
                        .map_err(context("cannot parse check state accounts"))?
                }
                key if is_common_field(key) => {}
                _ => return Err(unknown_field(key)),
            }
        }
        Ok(step)
    }

    fn process_tx_step(
        &self,
        tx_type: TransactionType,
        fields: &Map<String, Value>,
    ) -> Result<TxStep, ScenarioError> {
        let mut tx_ident = String::new();
        let mut tx = None;
        let mut expected_result = None;
        let mut display_logs = false;
        for (key, value) in fields {
            match key.as_str() {
                "id" | "txId" => tx_ident = parse_string(value).map_err(context("bad tx step id"))?,
                "displayLogs" => {
                    display_logs = parse_bool(value).map_err(context("bad displayLogs flag"))?
                }
                "tx" => tx = Some(self.process_tx(tx_type, value)?),
                "expect" => {
                    expected_result = Some(
                        self.process_expected_result(value)
                            .map_err(context("cannot parse tx expected result"))?,
                    )
                }
                key if is_common_field(key) => {}
                _ => return Err(unknown_field(key)),
            }
        }
        let tx = tx.ok_or_else(|| parse_error("tx field missing".to_string()))?;
        Ok(TxStep {
            tx_ident,
            comment: step_comment(fields)?,
            tx,
            expected_result,
            display_logs,
        })
    }
}

fn process_external_steps_step(
    fields: &Map<String, Value>,
) -> Result<ExternalStepsStep, ScenarioError> {
    let mut step = ExternalStepsStep {
        comment: step_comment(fields)?,
        ..Default::default()
    };
    for (key, value) in fields {
        match key.as_str() {
            "path" => step.path = parse_string(value).map_err(context("bad external steps path"))?,
            "traceGas" => {
                step.trace_gas = Some(parse_bool(value).map_err(context("bad traceGas flag"))?)
            }
            key if is_common_field(key) => {}
            _ => return Err(unknown_field(key)),
        }
    }
    if step.path.is_empty() {
        return Err(parse_error("external steps path missing".to_string()));
    }
    Ok(step)
}
