// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::collections::BTreeMap;

use num::{BigInt, BigUint, Signed};

use massa_scenario_models::address::{is_smart_contract_address, ADDRESS_LENGTH};

use crate::error::WorldError;

/// Code metadata given to contracts whose metadata was not specified:
/// upgradeable, readable, payable by smart contracts
pub const DEFAULT_CODE_METADATA: [u8; 2] = [0x05, 0x06];

/// Account of the in-memory ledger
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    pub address: Vec<u8>,
    pub nonce: u64,
    pub balance: BigUint,
    /// signed balance change since the last commit
    pub balance_delta: BigInt,
    pub storage: BTreeMap<Vec<u8>, Vec<u8>>,
    pub code: Vec<u8>,
    pub code_hash: Vec<u8>,
    pub code_metadata: Vec<u8>,
    pub owner_address: Vec<u8>,
    pub async_call_data: Vec<u8>,
    pub username: Vec<u8>,
    pub developer_reward: BigUint,
    pub shard_id: u32,
    pub is_smart_contract: bool,
}

impl Account {
    /// Empty account at `address`
    pub fn new(address: Vec<u8>) -> Self {
        Account {
            address,
            ..Default::default()
        }
    }

    /// Installs contract code; the hash follows the code
    pub fn set_code(&mut self, code: Vec<u8>) {
        self.code_hash = if code.is_empty() {
            Vec::new()
        } else {
            blake3::hash(&code).as_bytes().to_vec()
        };
        self.is_smart_contract = !code.is_empty();
        self.code = code;
    }

    /// Value stored at `key`, empty if absent
    pub fn storage_value(&self, key: &[u8]) -> Vec<u8> {
        self.storage.get(key).cloned().unwrap_or_default()
    }

    /// Writes a storage slot, an empty value removes it
    pub fn save_key_value(&mut self, key: Vec<u8>, value: Vec<u8>) {
        if value.is_empty() {
            self.storage.remove(&key);
        } else {
            self.storage.insert(key, value);
        }
    }

    /// Adds a signed amount to the balance; the balance can never go negative
    pub fn add_to_balance(&mut self, delta: &BigInt) -> Result<(), WorldError> {
        let new_balance = BigInt::from(self.balance.clone()) + delta;
        if new_balance.is_negative() {
            return Err(WorldError::InsufficientFunds);
        }
        self.balance = new_balance.magnitude().clone();
        self.balance_delta += delta;
        Ok(())
    }

    /// Subtracts `value` from the balance
    pub fn sub_from_balance(&mut self, value: &BigUint) -> Result<(), WorldError> {
        if self.balance < *value {
            return Err(WorldError::InsufficientFunds);
        }
        self.balance -= value;
        self.balance_delta -= BigInt::from(value.clone());
        Ok(())
    }

    /// Checks that the address length and layout agree with the code
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.address.len() != ADDRESS_LENGTH {
            return Err(WorldError::InvalidAccount(
                "account address should be 32 bytes long".to_string(),
            ));
        }
        let sc_address = is_smart_contract_address(&self.address);
        if sc_address && self.code.is_empty() {
            return Err(WorldError::InvalidAccount(format!(
                "account has a smart contract address, but has no code: 0x{}",
                hex::encode(&self.address)
            )));
        }
        if !sc_address && !self.code.is_empty() {
            return Err(WorldError::InvalidAccount(format!(
                "account has code but not a smart contract address: 0x{}",
                hex::encode(&self.address)
            )));
        }
        if sc_address && self.owner_address.is_empty() {
            return Err(WorldError::InvalidAccount(format!(
                "smart contract account has no owner: 0x{}",
                hex::encode(&self.address)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(name: &[u8], leading_zeros: usize) -> Vec<u8> {
        let mut address = vec![0u8; leading_zeros];
        address.extend_from_slice(name);
        address.resize(32, b'_');
        address
    }

    #[test]
    fn test_balance_never_negative() {
        let mut account = Account::new(address(b"a", 0));
        account.balance = BigUint::from(10u32);
        account.add_to_balance(&BigInt::from(-4)).unwrap();
        assert_eq!(account.balance, BigUint::from(6u32));
        assert_eq!(
            account.add_to_balance(&BigInt::from(-7)),
            Err(WorldError::InsufficientFunds)
        );
        assert_eq!(account.balance, BigUint::from(6u32));
        assert_eq!(
            account.sub_from_balance(&BigUint::from(7u32)),
            Err(WorldError::InsufficientFunds)
        );
    }

    #[test]
    fn test_validate_code_and_address_layout() {
        let mut user = Account::new(address(b"user", 0));
        assert!(user.validate().is_ok());
        user.set_code(b"code".to_vec());
        let err = user.validate().unwrap_err().to_string();
        assert!(err.starts_with("account has code but not a smart contract address: 0x"));

        let contract = Account::new(address(b"sc", 10));
        let err = contract.validate().unwrap_err().to_string();
        assert!(err.starts_with("account has a smart contract address, but has no code: 0x"));

        let mut contract = contract;
        contract.set_code(b"code".to_vec());
        let err = contract.validate().unwrap_err().to_string();
        assert!(err.starts_with("smart contract account has no owner: 0x"));

        contract.owner_address = address(b"user", 0);
        assert!(contract.validate().is_ok());
        assert!(contract.is_smart_contract);
        assert_eq!(contract.code_hash.len(), 32);
    }
}
