// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::BigUint;
use serde_json::Value;

use massa_scenario_exports::ScenarioError;
use massa_scenario_models::transaction::{
    CheckLogEntry, CheckLogs, EsdtTxData, Transaction, TransactionType, TxExpectedResult,
};
use massa_scenario_models::Parsed;

use super::value::{context, is_star, parse_string};
use super::{parse_error, Parser};

fn empty<T: Default>() -> Parsed<T> {
    Parsed::new(T::default(), Value::String(String::new()))
}

impl Parser {
    pub(super) fn process_tx(
        &self,
        tx_type: TransactionType,
        value: &Value,
    ) -> Result<Transaction, ScenarioError> {
        let fields = value
            .as_object()
            .ok_or_else(|| parse_error("unmarshalled transaction is not a map".to_string()))?;
        let mut tx = Transaction {
            tx_type,
            nonce: None,
            egld_value: empty::<BigUint>(),
            esdt_value: Vec::new(),
            from: empty(),
            to: empty(),
            function: String::new(),
            code: empty(),
            code_metadata: None,
            arguments: Vec::new(),
            gas_limit: empty(),
            gas_price: empty(),
        };

        for (key, value) in fields {
            match key.as_str() {
                "nonce" => {
                    tx.nonce =
                        Some(self.uint64(value).map_err(context("invalid transaction nonce"))?)
                }
                "from" => {
                    if !tx_type.has_sender() {
                        return Err(parse_error(
                            "`from` not allowed in transaction, it is always the zero address"
                                .to_string(),
                        ));
                    }
                    tx.from = self.account_address(value)?;
                }
                "to" => {
                    if tx_type == TransactionType::ScDeploy {
                        let to = parse_string(value).map_err(context("invalid transaction to"))?;
                        if !to.is_empty() {
                            return Err(parse_error(
                                "transaction to field not allowed for scDeploy transactions"
                                    .to_string(),
                            ));
                        }
                    } else {
                        tx.to = self.account_address(value)?;
                    }
                }
                "function" => {
                    tx.function =
                        parse_string(value).map_err(context("invalid transaction function"))?;
                    if !tx_type.has_function() && !tx.function.is_empty() {
                        return Err(parse_error(
                            "transaction function field not allowed in this context".to_string(),
                        ));
                    }
                }
                "value" | "egldValue" => {
                    if !tx_type.has_value() {
                        return Err(parse_error(
                            "`egldValue` not allowed in this context".to_string(),
                        ));
                    }
                    tx.egld_value = self
                        .big_uint(value)
                        .map_err(context("invalid transaction egldValue"))?;
                }
                "esdt" | "esdtValue" => {
                    if !tx_type.has_esdt() {
                        return Err(parse_error(
                            "`esdtValue` not allowed in this context".to_string(),
                        ));
                    }
                    tx.esdt_value = self
                        .process_tx_esdt(value)
                        .map_err(context("invalid transaction esdtValue"))?;
                }
                "arguments" => {
                    tx.arguments = self
                        .sub_tree_list(value)
                        .map_err(context("invalid transaction arguments"))?;
                    if !tx_type.has_arguments() && !tx.arguments.is_empty() {
                        return Err(parse_error(format!(
                            "function arguments not allowed for {} transactions",
                            tx_type
                        )));
                    }
                }
                "contractCode" => {
                    tx.code = self
                        .bytes_from_string(value)
                        .map_err(context("invalid transaction contract code"))?;
                    if !tx_type.has_code() && !tx.code.value.is_empty() {
                        return Err(parse_error(
                            "transaction contractCode field only allowed in scDeploy or scUpgrade transactions"
                                .to_string(),
                        ));
                    }
                }
                "codeMetadata" => {
                    let metadata = self
                        .bytes_from_string(value)
                        .map_err(context("invalid transaction contract codeMetadata"))?;
                    if !tx_type.has_code() && !metadata.value.is_empty() {
                        return Err(parse_error(
                            "transaction codeMetadata field only allowed in scDeploy or scUpgrade transactions"
                                .to_string(),
                        ));
                    }
                    tx.code_metadata = Some(metadata);
                }
                "gasLimit" => {
                    if !tx_type.has_gas_limit() {
                        return Err(parse_error(
                            "`gasLimit` not allowed in this context".to_string(),
                        ));
                    }
                    tx.gas_limit = self
                        .uint64(value)
                        .map_err(context("invalid transaction gasLimit"))?;
                }
                "gasPrice" => {
                    if !tx_type.has_gas_price() {
                        return Err(parse_error(
                            "`gasPrice` not allowed in this context".to_string(),
                        ));
                    }
                    tx.gas_price = self
                        .uint64(value)
                        .map_err(context("invalid transaction gasPrice"))?;
                }
                _ => return Err(parse_error(format!("unknown field in transaction: {}", key))),
            }
        }
        Ok(tx)
    }

    /// List of `{tokenIdentifier, nonce, value}`; a single object is accepted
    fn process_tx_esdt(&self, value: &Value) -> Result<Vec<EsdtTxData>, ScenarioError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| self.process_single_tx_esdt(item))
                .collect(),
            Value::Object(_) => Ok(vec![self.process_single_tx_esdt(value)?]),
            _ => Err(parse_error(
                "wrong ESDT transfer format, list expected".to_string(),
            )),
        }
    }

    fn process_single_tx_esdt(&self, value: &Value) -> Result<EsdtTxData, ScenarioError> {
        let fields = value
            .as_object()
            .ok_or_else(|| parse_error("wrong ESDT transfer format, map expected".to_string()))?;
        let mut transfer = EsdtTxData {
            token_identifier: empty(),
            nonce: empty(),
            value: empty(),
        };
        for (key, value) in fields {
            match key.as_str() {
                "tokenIdentifier" | "tokenName" => {
                    transfer.token_identifier = self
                        .bytes_from_string(value)
                        .map_err(context("invalid ESDT token identifier"))?
                }
                "nonce" => {
                    transfer.nonce = self
                        .uint64(value)
                        .map_err(context("invalid ESDT token nonce"))?
                }
                "value" => {
                    transfer.value = self
                        .big_uint(value)
                        .map_err(context("invalid ESDT transfer value"))?
                }
                _ => return Err(parse_error(format!("unknown transaction ESDT data field: {}", key))),
            }
        }
        Ok(transfer)
    }

    /// `expect` section of a tx step
    pub(super) fn process_expected_result(
        &self,
        value: &Value,
    ) -> Result<TxExpectedResult, ScenarioError> {
        let fields = value
            .as_object()
            .ok_or_else(|| parse_error("unmarshalled expected result is not a map".to_string()))?;
        let mut expected = TxExpectedResult::default();
        for (key, value) in fields {
            match key.as_str() {
                "out" => {
                    expected.out = self
                        .check_value_list(value)
                        .map_err(context("invalid tx expected result out"))?
                }
                "status" => {
                    expected.status = self
                        .check_big_uint(value)
                        .map_err(context("invalid tx expected result status"))?
                }
                "message" => {
                    expected.message = self
                        .check_bytes(value)
                        .map_err(context("invalid tx expected result message"))?
                }
                "logs" => {
                    expected.logs = self
                        .process_log_list(value)
                        .map_err(context("invalid tx expected result logs"))?
                }
                "gas" => {
                    expected.gas = self
                        .check_uint64(value)
                        .map_err(context("invalid tx expected result gas"))?
                }
                "refund" => {
                    expected.refund = self
                        .check_big_uint(value)
                        .map_err(context("invalid tx expected result refund"))?
                }
                _ => {
                    return Err(parse_error(format!(
                        "unknown tx expected result field: {}",
                        key
                    )))
                }
            }
        }
        Ok(expected)
    }

    fn process_log_list(&self, value: &Value) -> Result<CheckLogs, ScenarioError> {
        if is_star(value) {
            return Ok(CheckLogs::Star);
        }
        let list = value
            .as_array()
            .ok_or_else(|| parse_error("unmarshalled logs list is not a list".to_string()))?;
        let mut entries = Vec::with_capacity(list.len());
        let mut more_allowed_at_end = false;
        for item in list {
            match item {
                Value::String(text) if text == "+" => more_allowed_at_end = true,
                Value::String(_) => {
                    return Err(parse_error(
                        "unmarshalled log entry is an invalid string".to_string(),
                    ))
                }
                Value::Object(fields) => {
                    if more_allowed_at_end {
                        return Err(parse_error(
                            "log entries not allowed after \"+\"".to_string(),
                        ));
                    }
                    let mut entry = CheckLogEntry::default();
                    for (key, value) in fields {
                        match key.as_str() {
                            "address" => {
                                entry.address = self
                                    .check_bytes(value)
                                    .map_err(context("invalid log address"))?
                            }
                            "endpoint" | "identifier" => {
                                entry.endpoint = self
                                    .check_bytes(value)
                                    .map_err(context("invalid log identifier"))?
                            }
                            "topics" => {
                                entry.topics = self
                                    .check_value_list(value)
                                    .map_err(context("invalid log entry topics"))?
                            }
                            "data" => {
                                entry.data = self
                                    .check_value_list(value)
                                    .map_err(context("invalid log data"))?
                            }
                            _ => return Err(parse_error(format!("unknown log field: {}", key))),
                        }
                    }
                    entries.push(entry);
                }
                _ => {
                    return Err(parse_error(
                        "log entry should be either string or object".to_string(),
                    ))
                }
            }
        }
        Ok(CheckLogs::List {
            entries,
            more_allowed_at_end,
        })
    }
}
