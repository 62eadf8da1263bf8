// Copyright (c) 2022 MASSA LABS <info@massa.net>

use strum_macros::{Display, EnumString};

use crate::account::{Account, BlockInfo, CheckAccounts, NewAddressMock};
use crate::transaction::{Transaction, TxExpectedResult};
use crate::value::Parsed;

/// Gas cost table a scenario runs with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
pub enum GasSchedule {
    #[default]
    #[strum(serialize = "default")]
    Default,
    #[strum(serialize = "dummy")]
    Dummy,
    #[strum(serialize = "v3")]
    V3,
    #[strum(serialize = "v4")]
    V4,
}

/// A parsed scenario file
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub comment: String,
    /// compare the `gas` field of expected results
    pub check_gas: bool,
    /// print gas usage after each step
    pub trace_gas: bool,
    /// set by the controller when this file starts an independent test
    pub is_new_test: bool,
    pub gas_schedule: GasSchedule,
    pub steps: Vec<Step>,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            name: String::new(),
            comment: String::new(),
            check_gas: true,
            trace_gas: false,
            is_new_test: false,
            gas_schedule: GasSchedule::Default,
            steps: Vec::new(),
        }
    }
}

/// One unit of work of a scenario
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    SetState(SetStateStep),
    CheckState(CheckStateStep),
    Tx(TxStep),
    ExternalSteps(ExternalStepsStep),
    DumpState(DumpStateStep),
}

impl Step {
    /// Name of the step as written in scenario files
    pub fn kind(&self) -> &'static str {
        match self {
            Step::SetState(_) => "setState",
            Step::CheckState(_) => "checkState",
            Step::Tx(_) => "tx",
            Step::ExternalSteps(_) => "externalSteps",
            Step::DumpState(_) => "dumpState",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetStateStep {
    pub comment: String,
    pub accounts: Vec<Account>,
    pub previous_block_info: Option<BlockInfo>,
    pub current_block_info: Option<BlockInfo>,
    pub block_hashes: Vec<Parsed<Vec<u8>>>,
    pub new_address_mocks: Vec<NewAddressMock>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckStateStep {
    pub check_state_ident: String,
    pub comment: String,
    pub check_accounts: CheckAccounts,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TxStep {
    pub tx_ident: String,
    pub comment: String,
    pub tx: Transaction,
    pub expected_result: Option<TxExpectedResult>,
    /// log the VM output of this transaction
    pub display_logs: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalStepsStep {
    pub comment: String,
    pub path: String,
    /// `None` inherits the tracing of the including scenario
    pub trace_gas: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DumpStateStep {
    pub comment: String,
}
