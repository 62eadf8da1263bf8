// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::collections::BTreeMap;

use num::{BigInt, BigUint};
use tracing::debug;

use massa_scenario_models::address::{generate_mock_address, SYSTEM_ACCOUNT_ADDRESS};
use massa_scenario_models::vm::{GasScheduleMap, OutputAccount};

use crate::account::Account;
use crate::account_map::AccountMap;
use crate::block_info::{BlockInfo, RANDOM_SEED_LENGTH};
use crate::error::WorldError;
use crate::esdt::FullEsdtData;

/// Gas schedule section holding the cost of each builtin function
pub const BUILTIN_COST_SECTION: &str = "BuiltInCost";

/// Address a deployment by `creator_address` at `creator_nonce` must produce
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAddressMock {
    pub creator_address: Vec<u8>,
    pub creator_nonce: u64,
    pub new_address: Vec<u8>,
}

/// In-memory ledger the VM runs against.
///
/// Every transaction is bracketed by `create_state_backup` and either
/// `commit_changes` or `rollback_changes`; a snapshot is a deep copy of the
/// whole account map.
#[derive(Clone, Debug)]
pub struct World {
    pub accounts: AccountMap,
    snapshots: Vec<AccountMap>,
    pub previous_block_info: Option<BlockInfo>,
    pub current_block_info: Option<BlockInfo>,
    pub block_hashes: Vec<Vec<u8>>,
    pub new_address_mocks: Vec<NewAddressMock>,
    pub last_created_contract_address: Vec<u8>,
    pub(crate) builtin_gas_costs: Option<BTreeMap<String, u64>>,
    pub vm_type: Vec<u8>,
    pub num_shards: u32,
}

impl World {
    /// Empty world whose generated contract addresses carry `vm_type`
    pub fn new(vm_type: Vec<u8>) -> Self {
        World {
            accounts: AccountMap::new(),
            snapshots: Vec::new(),
            previous_block_info: None,
            current_block_info: None,
            block_hashes: Vec::new(),
            new_address_mocks: Vec::new(),
            last_created_contract_address: Vec::new(),
            builtin_gas_costs: None,
            vm_type,
            num_shards: 1,
        }
    }

    /// Forgets all state, keeps the builtin function setup
    pub fn clear(&mut self) {
        self.accounts = AccountMap::new();
        self.snapshots.clear();
        self.previous_block_info = None;
        self.current_block_info = None;
        self.block_hashes.clear();
        self.new_address_mocks.clear();
        self.last_created_contract_address.clear();
    }

    /// Reads the builtin function costs from a gas schedule
    pub fn init_builtin_functions(&mut self, gas_schedule: &GasScheduleMap) {
        self.builtin_gas_costs = Some(
            gas_schedule
                .get(BUILTIN_COST_SECTION)
                .cloned()
                .unwrap_or_default(),
        );
    }

    /// Random seed of the current block, zeroes when no block is set
    pub fn random_seed(&self) -> [u8; RANDOM_SEED_LENGTH] {
        self.current_block_info
            .as_ref()
            .map(|info| info.random_seed)
            .unwrap_or([0; RANDOM_SEED_LENGTH])
    }

    pub fn number_of_shards(&self) -> u32 {
        self.num_shards
    }

    pub fn builtin_functions_initialized(&self) -> bool {
        self.builtin_gas_costs.is_some()
    }

    pub fn accept_account(&mut self, account: Account) {
        self.accounts.put_account(account);
    }

    pub fn account(&self, address: &[u8]) -> Option<&Account> {
        self.accounts.get_account(address)
    }

    pub fn account_mut(&mut self, address: &[u8]) -> Option<&mut Account> {
        self.accounts.get_account_mut(address)
    }

    /// Pushes a deep copy of the accounts
    pub fn create_state_backup(&mut self) {
        self.snapshots.push(self.accounts.clone());
    }

    /// Backs up the state and returns the index to revert to
    pub fn get_snapshot(&mut self) -> isize {
        self.create_state_backup();
        self.journal_len()
    }

    /// Index of the latest snapshot, -1 when there is none
    pub fn journal_len(&self) -> isize {
        self.snapshots.len() as isize - 1
    }

    /// Restores snapshot `index` and drops it along with every later one
    pub fn revert_to_snapshot(&mut self, index: isize) -> Result<(), WorldError> {
        if self.snapshots.is_empty() {
            return Err(WorldError::NoSnapshots);
        }
        let max = self.journal_len();
        if index < 0 || index > max {
            return Err(WorldError::SnapshotOutOfBounds { index, max });
        }
        let snapshot = self
            .snapshots
            .drain(index as usize..)
            .next()
            .ok_or(WorldError::NoSnapshots)?;
        self.accounts = snapshot;
        Ok(())
    }

    /// Reverts to the latest backup
    pub fn rollback_changes(&mut self) -> Result<(), WorldError> {
        self.revert_to_snapshot(self.journal_len())
    }

    /// Keeps the current state and drops every backup
    pub fn commit_changes(&mut self) {
        self.snapshots.clear();
        for (_, account) in self.accounts.iter_mut() {
            account.balance_delta = BigInt::default();
        }
    }

    /// Applies the account changes of a successful execution
    pub fn update_accounts(
        &mut self,
        output_accounts: &BTreeMap<Vec<u8>, OutputAccount>,
        deleted_accounts: &[Vec<u8>],
    ) -> Result<(), WorldError> {
        for output in output_accounts.values() {
            let account = self.accounts.get_or_create_account(&output.address);
            account.add_to_balance(&output.balance_delta)?;
            if output.nonce > account.nonce {
                account.nonce = output.nonce;
            }
            if !output.code.is_empty() {
                account.set_code(output.code.clone());
                account.code_metadata = output.code_metadata.clone();
                account.owner_address = output.code_deployer_address.clone();
            }
            for update in &output.storage_updates {
                account.save_key_value(update.offset.clone(), update.data.clone());
            }
        }
        for address in deleted_accounts {
            self.accounts.delete_account(address);
        }
        Ok(())
    }

    /// Adds a signed amount to the balance of an existing account
    pub fn update_balance_with_delta(
        &mut self,
        address: &[u8],
        delta: &BigInt,
    ) -> Result<(), WorldError> {
        self.accounts
            .get_account_mut(address)
            .ok_or(WorldError::AccountNotFound)?
            .add_to_balance(delta)
    }

    /// Sender bookkeeping before execution: nonce increment and gas payment.
    ///
    /// The gas is only debited when the balance covers it.
    pub fn update_world_state_before(
        &mut self,
        from: &[u8],
        gas_limit: u64,
        gas_price: u64,
    ) -> Result<(), WorldError> {
        let sender = self
            .accounts
            .get_account_mut(from)
            .ok_or_else(|| WorldError::SenderNotFound(hex::encode(from)))?;
        sender.nonce += 1;
        let gas_cost = BigUint::from(gas_limit) * BigUint::from(gas_price);
        if sender.balance >= gas_cost {
            sender.balance -= gas_cost;
        } else {
            debug!(
                "sender 0x{} cannot pay {} gas at price {}",
                hex::encode(from),
                gas_limit,
                gas_price
            );
        }
        Ok(())
    }

    /// Address of a contract deployed by `creator_address` at `creator_nonce`
    pub fn create_new_address(&mut self, creator_address: &[u8], creator_nonce: u64) -> Vec<u8> {
        let address = self
            .new_address_mocks
            .iter()
            .find(|mock| {
                mock.creator_address == creator_address && mock.creator_nonce == creator_nonce
            })
            .map(|mock| mock.new_address.clone())
            .unwrap_or_else(|| generate_mock_address(creator_address, creator_nonce, &self.vm_type));
        self.last_created_contract_address = address.clone();
        address
    }

    pub fn current_block_info(&self) -> BlockInfo {
        self.current_block_info.clone().unwrap_or_default()
    }

    pub fn previous_block_info(&self) -> BlockInfo {
        self.previous_block_info.clone().unwrap_or_default()
    }

    /// Tokens of an account; NFT instances stored without metadata borrow
    /// the metadata kept on the system account
    pub fn full_esdt_data(
        &self,
        address: &[u8],
    ) -> Result<BTreeMap<Vec<u8>, FullEsdtData>, WorldError> {
        let Some(account) = self.accounts.get_account(address) else {
            return Ok(BTreeMap::new());
        };
        let mut tokens = account.full_esdt_data()?;
        let system_account = self.accounts.get_account(&SYSTEM_ACCOUNT_ADDRESS);
        for (token_identifier, data) in tokens.iter_mut() {
            for (nonce, instance) in data.instances.iter_mut() {
                if instance.metadata.is_some() || *nonce == 0 {
                    continue;
                }
                if let Some(system_account) = system_account {
                    instance.metadata = system_account
                        .esdt_token(token_identifier, *nonce)?
                        .and_then(|global| global.metadata);
                }
            }
        }
        Ok(tokens)
    }
}
