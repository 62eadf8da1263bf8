// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Inputs and outputs of contract and builtin function execution.

use std::collections::BTreeMap;

use num::{BigInt, BigUint};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

/// Function a transaction calls to replace the code of a contract
pub const UPGRADE_FUNCTION_NAME: &str = "upgradeContract";

/// How a contract got called
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallType {
    /// call coming straight from a transaction
    #[default]
    DirectCall,
    /// asynchronous call
    AsynchronousCall,
    /// callback of an asynchronous call
    AsynchronousCallBack,
    /// execution at the end of an ESDT transfer
    EsdtTransferAndExecute,
}

/// Outcome of an execution, numbered like the VM protocol does
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, IntoPrimitive, TryFromPrimitive)]
#[repr(u64)]
pub enum ReturnCode {
    #[default]
    #[strum(serialize = "ok")]
    Ok = 0,
    #[strum(serialize = "function not found")]
    FunctionNotFound = 1,
    #[strum(serialize = "wrong signature for function")]
    FunctionWrongSignature = 2,
    #[strum(serialize = "contract not found")]
    ContractNotFound = 3,
    #[strum(serialize = "user error")]
    UserError = 4,
    #[strum(serialize = "out of gas")]
    OutOfGas = 5,
    #[strum(serialize = "account collision")]
    AccountCollision = 6,
    #[strum(serialize = "out of funds")]
    OutOfFunds = 7,
    #[strum(serialize = "call stack overflow")]
    CallStackOverFlow = 8,
    #[strum(serialize = "contract invalid")]
    ContractInvalid = 9,
    #[strum(serialize = "execution failed")]
    ExecutionFailed = 10,
    #[strum(serialize = "upgrade failed")]
    UpgradeFailed = 11,
    #[strum(serialize = "simulate failed")]
    SimulateFailed = 12,
}

impl ReturnCode {
    /// Numeric code
    pub fn code(&self) -> u64 {
        u64::from(*self)
    }
}

/// Kind of an ESDT token
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum EsdtTokenType {
    #[default]
    Fungible = 0,
    NonFungible = 1,
}

/// One token movement attached to a call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EsdtTransfer {
    pub token_identifier: Vec<u8>,
    pub token_nonce: u64,
    pub value: BigUint,
    pub token_type: EsdtTokenType,
}

/// Fields shared by every kind of call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VmInput {
    pub caller_addr: Vec<u8>,
    pub arguments: Vec<Vec<u8>>,
    pub call_value: BigUint,
    pub call_type: CallType,
    pub gas_price: u64,
    pub gas_provided: u64,
    pub original_tx_hash: Vec<u8>,
    pub current_tx_hash: Vec<u8>,
    pub esdt_transfers: Vec<EsdtTransfer>,
}

/// Call of a function on an existing contract
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractCallInput {
    pub vm_input: VmInput,
    pub recipient_addr: Vec<u8>,
    pub function: String,
}

/// Deployment of a new contract
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractCreateInput {
    pub vm_input: VmInput,
    pub contract_code: Vec<u8>,
    pub contract_code_metadata: Vec<u8>,
}

/// Write of one storage slot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageUpdate {
    pub offset: Vec<u8>,
    pub data: Vec<u8>,
}

/// Changes an execution requests on one account
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputAccount {
    pub address: Vec<u8>,
    pub nonce: u64,
    pub balance_delta: BigInt,
    pub storage_updates: Vec<StorageUpdate>,
    pub code: Vec<u8>,
    pub code_metadata: Vec<u8>,
    pub code_deployer_address: Vec<u8>,
}

impl OutputAccount {
    /// Empty change set for `address`
    pub fn new(address: Vec<u8>) -> Self {
        OutputAccount {
            address,
            ..Default::default()
        }
    }
}

/// Event emitted during execution
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogEntry {
    pub identifier: Vec<u8>,
    pub address: Vec<u8>,
    pub topics: Vec<Vec<u8>>,
    pub data: Vec<Vec<u8>>,
}

/// Result of an execution, applied to the world only when `return_code` is `Ok`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VmOutput {
    pub return_data: Vec<Vec<u8>>,
    pub return_code: ReturnCode,
    pub return_message: String,
    pub gas_remaining: u64,
    pub gas_refund: BigUint,
    pub output_accounts: BTreeMap<Vec<u8>, OutputAccount>,
    pub deleted_accounts: Vec<Vec<u8>>,
    pub touched_accounts: Vec<Vec<u8>>,
    pub logs: Vec<LogEntry>,
}

impl VmOutput {
    /// Failed execution that changes nothing
    pub fn failure(return_code: ReturnCode, return_message: impl Into<String>) -> Self {
        VmOutput {
            return_code,
            return_message: return_message.into(),
            ..Default::default()
        }
    }

    /// Change set for `address`, created empty if needed
    pub fn output_account_mut(&mut self, address: &[u8]) -> &mut OutputAccount {
        self.output_accounts
            .entry(address.to_vec())
            .or_insert_with(|| OutputAccount::new(address.to_vec()))
    }
}

/// Gas used per contract address, then per function: one entry per call
pub type GasTrace = BTreeMap<Vec<u8>, BTreeMap<String, Vec<u64>>>;

/// Gas costs by section (`BuiltInCost`, `BaseOperationCost`, ...) then by name
pub type GasScheduleMap = BTreeMap<String, BTreeMap<String, u64>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_code_names() {
        assert_eq!(ReturnCode::UserError.to_string(), "user error");
        assert_eq!(ReturnCode::OutOfFunds.code(), 7);
        assert_eq!(ReturnCode::try_from(5u64).ok(), Some(ReturnCode::OutOfGas));
    }
}
