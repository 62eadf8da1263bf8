// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::{BigInt, BigUint};
use tracing::{debug, info};

use massa_scenario_exports::ScenarioError;
use massa_scenario_logging::massa_scenario_trace;
use massa_scenario_models::address::REWARD_KEY;
use massa_scenario_models::scenario::TxStep;
use massa_scenario_models::transaction::{EsdtTxData, Transaction, TransactionType};
use massa_scenario_models::Parsed;
use massa_scenario_models::vm::{
    CallType, ContractCallInput, ContractCreateInput, EsdtTokenType, EsdtTransfer, ReturnCode,
    StorageUpdate, VmInput, VmOutput, UPGRADE_FUNCTION_NAME,
};
use massa_scenario_world::{convert_to_builtin_function, DEFAULT_CODE_METADATA};

use crate::executor::ScenarioExecutor;

/// Length of transaction hashes
const TX_HASH_LENGTH: usize = 32;

/// Deterministic hash of a transaction: its id, truncated or padded with dots
pub fn generate_tx_hash(tx_id: &str) -> Vec<u8> {
    let mut hash = tx_id.as_bytes().to_vec();
    hash.resize(TX_HASH_LENGTH, b'.');
    hash
}

fn vm_not_initialized() -> ScenarioError {
    ScenarioError::VmError("VM not initialized".to_string())
}

fn esdt_transfers(esdt_value: &[EsdtTxData]) -> Vec<EsdtTransfer> {
    esdt_value
        .iter()
        .map(|esdt| EsdtTransfer {
            token_identifier: esdt.token_identifier.value.clone(),
            token_nonce: esdt.nonce.value,
            value: esdt.value.value.clone(),
            token_type: if esdt.nonce.value == 0 {
                EsdtTokenType::Fungible
            } else {
                EsdtTokenType::NonFungible
            },
        })
        .collect()
}

fn tx_vm_input(tx: &Transaction, tx_hash: Vec<u8>) -> VmInput {
    VmInput {
        caller_addr: tx.from.value.clone(),
        arguments: tx
            .arguments
            .iter()
            .map(|argument| argument.value.clone())
            .collect(),
        call_value: tx.egld_value.value.clone(),
        call_type: CallType::DirectCall,
        gas_price: tx.gas_price.value,
        gas_provided: tx.gas_limit.value,
        original_tx_hash: tx_hash.clone(),
        current_tx_hash: tx_hash,
        esdt_transfers: esdt_transfers(&tx.esdt_value),
    }
}

/// Call input of a transaction
fn tx_call_input(tx: &Transaction, tx_hash: Vec<u8>) -> ContractCallInput {
    ContractCallInput {
        vm_input: tx_vm_input(tx, tx_hash),
        recipient_addr: tx.to.value.clone(),
        function: tx.function.clone(),
    }
}

fn code_metadata(tx: &Transaction) -> Vec<u8> {
    match &tx.code_metadata {
        Some(metadata) => metadata.value.clone(),
        None => DEFAULT_CODE_METADATA.to_vec(),
    }
}

/// Output of a transaction the sender cannot pay for
fn out_of_funds_result() -> VmOutput {
    VmOutput::failure(ReturnCode::OutOfFunds, "")
}

/// Output moving the tx value to the recipient, nothing else
fn simple_transfer_output(tx: &Transaction) -> VmOutput {
    let mut output = VmOutput::default();
    output.output_account_mut(&tx.to.value).balance_delta =
        BigInt::from(tx.egld_value.value.clone());
    output
}

fn builtin_failure(function: &str, output: &VmOutput) -> ScenarioError {
    ScenarioError::ExecutionError(format!(
        "{} failed: retcode = {}, msg = {}",
        function,
        output.return_code.code(),
        output.return_message
    ))
}

impl ScenarioExecutor {
    pub(crate) fn execute_tx_step(&mut self, step: &TxStep) -> Result<VmOutput, ScenarioError> {
        massa_scenario_trace!("tx_step", {
            "id": step.tx_ident,
            "type": step.tx.tx_type.to_string(),
            "comment": step.comment
        });
        let output = self.execute_tx(&step.tx_ident, &step.tx)?;
        if step.display_logs {
            info!(
                "tx {}: return code {} ({}), message \"{}\", gas remaining {}, {} logs",
                step.tx_ident,
                output.return_code.code(),
                output.return_code,
                output.return_message,
                output.gas_remaining,
                output.logs.len()
            );
            for log in &output.logs {
                info!("tx {} log: {:?}", step.tx_ident, log);
            }
        }

        match &step.expected_result {
            Some(expected) => self.check_tx_results(&step.tx_ident, expected, &output)?,
            None if output.return_code != ReturnCode::Ok => {
                return Err(ScenarioError::ExecutionError(format!(
                    "tx step failed: retcode={}, msg={}",
                    output.return_code.code(),
                    output.return_message
                )));
            }
            None => {}
        }
        Ok(output)
    }

    /// Runs a transaction inside a backup bracket.
    ///
    /// The world is committed when the execution succeeds and rolled back
    /// when it returns a non-OK code or fails.
    pub(crate) fn execute_tx(
        &mut self,
        tx_id: &str,
        tx: &Transaction,
    ) -> Result<VmOutput, ScenarioError> {
        let mut gas_for_execution = 0;
        if tx.tx_type.has_sender() {
            self.world
                .update_world_state_before(&tx.from.value, tx.gas_limit.value, tx.gas_price.value)
                .map_err(|err| {
                    ScenarioError::ExecutionError(format!("could not set up tx {}: {}", tx_id, err))
                })?;
            gas_for_execution = tx.gas_limit.value;
        }

        self.world.create_state_backup();
        match self.execute_tx_in_bracket(tx_id, tx, gas_for_execution) {
            Ok(output) if output.return_code == ReturnCode::Ok => {
                self.world.commit_changes();
                Ok(output)
            }
            Ok(output) => {
                debug!(
                    "tx {} failed with {} ({}), rolling back",
                    tx_id, output.return_code, output.return_message
                );
                self.world.rollback_changes()?;
                Ok(output)
            }
            Err(err) => {
                self.world.rollback_changes()?;
                Err(err)
            }
        }
    }

    fn execute_tx_in_bracket(
        &mut self,
        tx_id: &str,
        tx: &Transaction,
        gas_for_execution: u64,
    ) -> Result<VmOutput, ScenarioError> {
        if !self.sender_has_enough_balance(tx) {
            return Ok(out_of_funds_result());
        }
        let output = match tx.tx_type {
            TransactionType::ScDeploy => {
                let output = self.sc_create(tx_id, tx)?;
                if self.peek_trace_gas() {
                    println!(
                        "\nIn txID: {}, step type: Deploy, total gas used: {}",
                        tx_id,
                        gas_for_execution.saturating_sub(output.gas_remaining)
                    );
                }
                output
            }
            TransactionType::ScUpgrade => self.sc_upgrade(tx_id, tx)?,
            TransactionType::ScQuery => {
                // the contract queries itself, without gas restrictions
                let mut query = tx.clone();
                query.from = query.to.clone();
                query.gas_limit.value = i64::MAX as u64;
                let output = self.sc_call(tx_id, &query)?;
                self.print_call_gas(tx_id, &query, query.gas_limit.value, &output);
                output
            }
            TransactionType::ScCall => {
                let output = self.sc_call(tx_id, tx)?;
                self.print_call_gas(tx_id, tx, gas_for_execution, &output);
                output
            }
            TransactionType::Transfer => {
                if tx.esdt_value.is_empty() {
                    simple_transfer_output(tx)
                } else {
                    self.direct_esdt_transfer(tx)?
                }
            }
            TransactionType::ValidatorReward => self.validator_reward_output(tx)?,
        };

        if output.return_code == ReturnCode::Ok {
            self.update_state_after_tx(tx, &output)?;
        }
        Ok(output)
    }

    fn print_call_gas(&self, tx_id: &str, tx: &Transaction, gas_for_execution: u64, output: &VmOutput) {
        if self.peek_trace_gas() {
            println!(
                "\nIn txID: {}, step type: ScCall, function: {}, total gas used: {}",
                tx_id,
                tx.function,
                gas_for_execution.saturating_sub(output.gas_remaining)
            );
        }
    }

    fn sender_has_enough_balance(&self, tx: &Transaction) -> bool {
        if !tx.tx_type.has_sender() {
            return true;
        }
        self.world
            .account(&tx.from.value)
            .map_or(false, |sender| sender.balance >= tx.egld_value.value)
    }

    fn sc_create(&mut self, tx_id: &str, tx: &Transaction) -> Result<VmOutput, ScenarioError> {
        let input = ContractCreateInput {
            vm_input: tx_vm_input(tx, generate_tx_hash(tx_id)),
            contract_code: tx.code.value.clone(),
            contract_code_metadata: code_metadata(tx),
        };
        let vm = self.vm.as_mut().ok_or_else(vm_not_initialized)?;
        vm.run_smart_contract_create(&mut self.world, &input)
    }

    /// Calls `upgradeContract` with the new code and metadata first
    fn sc_upgrade(&mut self, tx_id: &str, tx: &Transaction) -> Result<VmOutput, ScenarioError> {
        let mut upgrade = tx.clone();
        upgrade.function = UPGRADE_FUNCTION_NAME.to_string();
        let mut arguments = vec![
            tx.code.clone(),
            Parsed::new(code_metadata(tx), serde_json::Value::Null),
        ];
        arguments.extend(tx.arguments.iter().cloned());
        upgrade.arguments = arguments;
        self.sc_call(tx_id, &upgrade)
    }

    fn sc_call(&mut self, tx_id: &str, tx: &Transaction) -> Result<VmOutput, ScenarioError> {
        let recipient = self.world.account(&tx.to.value).ok_or_else(|| {
            ScenarioError::ExecutionError(format!(
                "tx recipient (address: {}) does not exist",
                hex::encode(&tx.to.value)
            ))
        })?;
        if recipient.code.is_empty() {
            return Err(ScenarioError::ExecutionError(format!(
                "tx recipient (address: {}) is not a smart contract",
                hex::encode(&tx.to.value)
            )));
        }

        let input = tx_call_input(tx, generate_tx_hash(tx_id));
        if !input.vm_input.esdt_transfers.is_empty() {
            let builtin_input = convert_to_builtin_function(&input);
            let output = self.world.process_builtin_function(&builtin_input)?;
            if output.return_code != ReturnCode::Ok {
                return Err(builtin_failure(&builtin_input.function, &output));
            }
        }
        let vm = self.vm.as_mut().ok_or_else(vm_not_initialized)?;
        vm.run_smart_contract_call(&mut self.world, &input)
    }

    fn direct_esdt_transfer(&mut self, tx: &Transaction) -> Result<VmOutput, ScenarioError> {
        let input = tx_call_input(tx, Vec::new());
        let builtin_input = convert_to_builtin_function(&input);
        let output = self.world.process_builtin_function(&builtin_input)?;
        if output.return_code != ReturnCode::Ok {
            return Err(builtin_failure(&builtin_input.function, &output));
        }
        Ok(output)
    }

    /// Credits the reward and accumulates it under the reward storage key
    fn validator_reward_output(&mut self, tx: &Transaction) -> Result<VmOutput, ScenarioError> {
        let recipient = self.world.account(&tx.to.value).ok_or_else(|| {
            ScenarioError::ExecutionError(format!(
                "tx recipient (address: {}) does not exist",
                hex::encode(&tx.to.value)
            ))
        })?;
        let reward = &tx.egld_value.value;
        let accumulated = BigUint::from_bytes_be(&recipient.storage_value(REWARD_KEY)) + reward;

        let mut output = VmOutput::default();
        let rewarded = output.output_account_mut(&tx.to.value);
        rewarded.balance_delta = BigInt::from(reward.clone());
        rewarded.storage_updates.push(StorageUpdate {
            offset: REWARD_KEY.to_vec(),
            data: massa_scenario_json::biguint_to_bytes(&accumulated),
        });
        Ok(output)
    }

    /// Applies a successful output: the sender pays the value, output
    /// accounts are updated and the balance deltas must add up to the value
    fn update_state_after_tx(&mut self, tx: &Transaction, output: &VmOutput) -> Result<(), ScenarioError> {
        let value = BigInt::from(tx.egld_value.value.clone());
        if tx.tx_type.has_sender() {
            self.world.update_balance_with_delta(&tx.from.value, &-value.clone())?;
        }
        self.world
            .update_accounts(&output.output_accounts, &output.deleted_accounts)?;

        if tx.tx_type.has_sender() {
            let sum_of_balance_deltas: BigInt = output
                .output_accounts
                .values()
                .map(|account| &account.balance_delta)
                .sum();
            if sum_of_balance_deltas != value {
                return Err(ScenarioError::ExecutionError(format!(
                    "sum of balance deltas should equal call value. Sum of balance deltas: {} (0x{:x}). Call value: {} (0x{:x})",
                    sum_of_balance_deltas, sum_of_balance_deltas, value, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_hash_padding_and_truncation() {
        assert_eq!(generate_tx_hash("tx-1"), b"tx-1............................".to_vec());
        let long = "a-very-long-transaction-identifier-over-32";
        assert_eq!(generate_tx_hash(long), long.as_bytes()[..32].to_vec());
        assert_eq!(generate_tx_hash("").len(), 32);
    }
}
