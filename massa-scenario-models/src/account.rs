// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Accounts as written in `setState` and `checkState` steps.

use num::BigUint;

use crate::check::{Check, CheckValueList};
use crate::value::Parsed;

/// Storage slot set by a `setState` step
#[derive(Clone, Debug, PartialEq)]
pub struct StorageKeyValue {
    pub key: Parsed<Vec<u8>>,
    pub value: Parsed<Vec<u8>>,
}

/// One nonce of a token held by an account
#[derive(Clone, Debug, PartialEq)]
pub struct EsdtInstance {
    pub nonce: Parsed<u64>,
    pub balance: Parsed<BigUint>,
    pub creator: Option<Parsed<Vec<u8>>>,
    pub royalties: Option<Parsed<u64>>,
    pub hash: Option<Parsed<Vec<u8>>>,
    pub uris: Vec<Parsed<Vec<u8>>>,
    pub attributes: Option<Parsed<Vec<u8>>>,
}

/// Token held by an account in a `setState` step
#[derive(Clone, Debug, PartialEq)]
pub struct EsdtData {
    pub token_identifier: Parsed<Vec<u8>>,
    pub instances: Vec<EsdtInstance>,
    pub last_nonce: Option<Parsed<u64>>,
    pub roles: Vec<String>,
    pub frozen: Option<Parsed<u64>>,
}

/// Account written by a `setState` step.
///
/// With `update` set, only the specified fields are merged into the existing
/// account; otherwise the account is replaced entirely.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub address: Parsed<Vec<u8>>,
    pub comment: Option<String>,
    pub update: bool,
    pub nonce: Option<Parsed<u64>>,
    pub balance: Option<Parsed<BigUint>>,
    pub esdt: Vec<EsdtData>,
    pub username: Option<Parsed<Vec<u8>>>,
    pub storage: Vec<StorageKeyValue>,
    pub code: Option<Parsed<Vec<u8>>>,
    pub code_metadata: Option<Parsed<Vec<u8>>>,
    pub owner: Option<Parsed<Vec<u8>>>,
    pub developer_reward: Option<Parsed<BigUint>>,
    pub shard: Option<Parsed<u64>>,
    pub async_call_data: Option<Parsed<Vec<u8>>>,
}

impl Account {
    /// Account with only an address, every other field unspecified
    pub fn new(address: Parsed<Vec<u8>>) -> Self {
        Account {
            address,
            comment: None,
            update: false,
            nonce: None,
            balance: None,
            esdt: Vec::new(),
            username: None,
            storage: Vec::new(),
            code: None,
            code_metadata: None,
            owner: None,
            developer_reward: None,
            shard: None,
            async_call_data: None,
        }
    }
}

/// Expected storage slot
#[derive(Clone, Debug, PartialEq)]
pub struct CheckStorageEntry {
    pub key: Parsed<Vec<u8>>,
    pub value: Check<Vec<u8>>,
}

/// Expected storage of an account
#[derive(Clone, Debug, PartialEq)]
pub enum CheckStorage {
    /// `"storage": "*"`
    Ignore,
    /// listed slots; unlisted non-empty slots fail unless more are allowed
    Entries {
        entries: Vec<CheckStorageEntry>,
        more_allowed: bool,
    },
}

impl Default for CheckStorage {
    fn default() -> Self {
        CheckStorage::Entries {
            entries: Vec::new(),
            more_allowed: false,
        }
    }
}

/// Expected nonce of a token held by an account
#[derive(Clone, Debug, PartialEq)]
pub struct CheckEsdtInstance {
    pub nonce: Parsed<u64>,
    pub balance: Check<BigUint>,
    pub creator: Check<Vec<u8>>,
    pub royalties: Check<u64>,
    pub hash: Check<Vec<u8>>,
    pub uris: CheckValueList,
    pub attributes: Check<Vec<u8>>,
}

impl CheckEsdtInstance {
    /// Expects a zero balance for `nonce`, nothing else compared
    pub fn zero_balance(nonce: Parsed<u64>) -> Self {
        CheckEsdtInstance {
            nonce,
            balance: Check::default_value(BigUint::default()),
            creator: Check::Unspecified,
            royalties: Check::Unspecified,
            hash: Check::Unspecified,
            uris: Check::Unspecified,
            attributes: Check::Unspecified,
        }
    }
}

/// Expected token of an account
#[derive(Clone, Debug, PartialEq)]
pub struct CheckEsdtData {
    pub token_identifier: Parsed<Vec<u8>>,
    pub instances: Vec<CheckEsdtInstance>,
    pub last_nonce: Check<u64>,
    pub roles: Vec<String>,
    pub frozen: Check<u64>,
}

/// Expected tokens of an account
#[derive(Clone, Debug, PartialEq)]
pub enum CheckEsdt {
    /// `"esdt": "*"`
    Ignore,
    /// listed tokens; unlisted tokens must be empty unless more are allowed
    Tokens {
        tokens: Vec<CheckEsdtData>,
        more_allowed: bool,
    },
}

impl Default for CheckEsdt {
    fn default() -> Self {
        CheckEsdt::Tokens {
            tokens: Vec::new(),
            more_allowed: false,
        }
    }
}

/// Account of a `checkState` step
#[derive(Clone, Debug, PartialEq)]
pub struct CheckAccount {
    pub address: Parsed<Vec<u8>>,
    pub comment: Option<String>,
    pub nonce: Check<u64>,
    pub balance: Check<BigUint>,
    pub username: Check<Vec<u8>>,
    pub code: Check<Vec<u8>>,
    pub code_metadata: Check<Vec<u8>>,
    pub owner: Check<Vec<u8>>,
    pub developer_reward: Check<BigUint>,
    pub async_call_data: Check<Vec<u8>>,
    pub storage: CheckStorage,
    pub esdt: CheckEsdt,
}

impl CheckAccount {
    /// Expectation on `address` alone
    pub fn new(address: Parsed<Vec<u8>>) -> Self {
        CheckAccount {
            address,
            comment: None,
            nonce: Check::Unspecified,
            balance: Check::Unspecified,
            username: Check::Unspecified,
            code: Check::Unspecified,
            code_metadata: Check::Unspecified,
            owner: Check::Unspecified,
            developer_reward: Check::Unspecified,
            async_call_data: Check::Unspecified,
            storage: CheckStorage::default(),
            esdt: CheckEsdt::default(),
        }
    }
}

/// Accounts of a `checkState` step
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckAccounts {
    pub accounts: Vec<CheckAccount>,
    /// `"+": ""` in the accounts map: accounts not listed are tolerated
    pub more_accounts_allowed: bool,
}

/// Address a mocked deployment must produce
#[derive(Clone, Debug, PartialEq)]
pub struct NewAddressMock {
    pub creator_address: Parsed<Vec<u8>>,
    pub creator_nonce: Parsed<u64>,
    pub new_address: Parsed<Vec<u8>>,
}

/// Block info fields a `setState` step changes; absent fields are kept
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockInfo {
    pub block_timestamp: Option<Parsed<u64>>,
    pub block_nonce: Option<Parsed<u64>>,
    pub block_round: Option<Parsed<u64>>,
    pub block_epoch: Option<Parsed<u64>>,
    pub block_random_seed: Option<Parsed<Vec<u8>>>,
}
