// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::BigUint;
use strum_macros::{Display, EnumString};

use crate::check::{Check, CheckValueList};
use crate::value::Parsed;

/// Kind of transaction step, named after the `step` field of the scenario file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
pub enum TransactionType {
    /// deploys new contract code
    #[strum(serialize = "scDeploy")]
    ScDeploy,
    /// replaces the code of an existing contract
    #[strum(serialize = "scUpgrade")]
    ScUpgrade,
    /// calls a contract function
    #[strum(serialize = "scCall")]
    ScCall,
    /// read-only call, changes are not applied
    #[strum(serialize = "scQuery")]
    ScQuery,
    /// moves EGLD or ESDT tokens
    #[strum(serialize = "transfer")]
    Transfer,
    /// credits a reward to an account without a sender
    #[strum(serialize = "validatorReward")]
    ValidatorReward,
}

impl TransactionType {
    /// The tx has a `from` field and pays for itself
    pub fn has_sender(&self) -> bool {
        !matches!(
            self,
            TransactionType::ValidatorReward | TransactionType::ScQuery
        )
    }

    /// The tx has a `to` field
    pub fn has_receiver(&self) -> bool {
        *self != TransactionType::ScDeploy
    }

    /// The tx calls a named function
    pub fn has_function(&self) -> bool {
        matches!(self, TransactionType::ScCall | TransactionType::ScQuery)
    }

    /// The tx can carry EGLD
    pub fn has_value(&self) -> bool {
        *self != TransactionType::ScQuery
    }

    /// The tx can carry ESDT transfers
    pub fn has_esdt(&self) -> bool {
        matches!(
            self,
            TransactionType::ScCall
                | TransactionType::ScDeploy
                | TransactionType::ScUpgrade
                | TransactionType::Transfer
        )
    }

    /// The tx can carry call arguments
    pub fn has_arguments(&self) -> bool {
        !matches!(
            self,
            TransactionType::Transfer | TransactionType::ValidatorReward
        )
    }

    /// The tx carries contract code
    pub fn has_code(&self) -> bool {
        matches!(self, TransactionType::ScDeploy | TransactionType::ScUpgrade)
    }

    /// The tx has a gas limit
    pub fn has_gas_limit(&self) -> bool {
        self.has_sender()
    }

    /// The tx has a gas price
    pub fn has_gas_price(&self) -> bool {
        self.has_sender()
    }
}

/// ESDT movement requested by a transaction
#[derive(Clone, Debug, PartialEq)]
pub struct EsdtTxData {
    pub token_identifier: Parsed<Vec<u8>>,
    pub nonce: Parsed<u64>,
    pub value: Parsed<BigUint>,
}

/// Transaction of a tx step
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub tx_type: TransactionType,
    pub nonce: Option<Parsed<u64>>,
    pub egld_value: Parsed<BigUint>,
    pub esdt_value: Vec<EsdtTxData>,
    pub from: Parsed<Vec<u8>>,
    pub to: Parsed<Vec<u8>>,
    pub function: String,
    pub code: Parsed<Vec<u8>>,
    pub code_metadata: Option<Parsed<Vec<u8>>>,
    pub arguments: Vec<Parsed<Vec<u8>>>,
    pub gas_limit: Parsed<u64>,
    pub gas_price: Parsed<u64>,
}

/// Expected event of a transaction
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckLogEntry {
    pub address: Check<Vec<u8>>,
    pub endpoint: Check<Vec<u8>>,
    pub topics: CheckValueList,
    pub data: CheckValueList,
}

/// Expected events of a transaction
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CheckLogs {
    /// no `logs` field
    #[default]
    Unspecified,
    /// `"logs": "*"`
    Star,
    /// listed events, `"+"` at the end of the list allows more
    List {
        entries: Vec<CheckLogEntry>,
        more_allowed_at_end: bool,
    },
}

/// `expect` section of a tx step
#[derive(Clone, Debug, PartialEq)]
pub struct TxExpectedResult {
    pub out: CheckValueList,
    pub status: Check<BigUint>,
    pub message: Check<Vec<u8>>,
    pub logs: CheckLogs,
    pub gas: Check<u64>,
    pub refund: Check<BigUint>,
}

impl Default for TxExpectedResult {
    /// Success with an empty message, nothing else compared
    fn default() -> Self {
        TxExpectedResult {
            out: Check::Unspecified,
            status: Check::default_value(BigUint::default()),
            message: Check::default_value(Vec::new()),
            logs: CheckLogs::Unspecified,
            gas: Check::Unspecified,
            refund: Check::Unspecified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_type_predicates() {
        let query = TransactionType::from_str("scQuery").unwrap();
        assert!(!query.has_sender());
        assert!(query.has_function());
        assert!(!query.has_value());
        assert!(!TransactionType::ValidatorReward.has_sender());
        assert!(!TransactionType::ScDeploy.has_receiver());
        assert!(TransactionType::Transfer.has_esdt());
        assert!(!TransactionType::Transfer.has_arguments());
        assert_eq!(TransactionType::ScUpgrade.to_string(), "scUpgrade");
    }
}
