// Copyright (c) 2022 MASSA LABS <info@massa.net>

use massa_scenario_exports::ScenarioError;
use massa_scenario_logging::massa_scenario_trace;
use massa_scenario_models::account::{self as scenario_account, EsdtData};
use massa_scenario_models::address::{is_smart_contract_address, ADDRESS_LENGTH};
use massa_scenario_models::scenario::SetStateStep;
use massa_scenario_models::vm::EsdtTokenType;
use massa_scenario_models::Parsed;
use massa_scenario_world::esdt::{EsdtMetadata, EsdtToken};
use massa_scenario_world::{
    Account, BlockInfo, NewAddressMock, WorldError, DEFAULT_CODE_METADATA,
};
use tracing::debug;

use crate::executor::ScenarioExecutor;

impl ScenarioExecutor {
    pub(crate) fn execute_set_state_step(&mut self, step: &SetStateStep) -> Result<(), ScenarioError> {
        massa_scenario_trace!("set_state_step", {
            "comment": step.comment,
            "accounts": step.accounts.len()
        });
        for account in &step.accounts {
            let result = if account.update {
                self.update_account(account)
            } else {
                self.put_new_account(account)
            };
            if let Err(err) = result {
                debug!("could not set account {}: {}", account.address.original_str(), err);
                return Err(err);
            }
        }

        self.world.previous_block_info = merge_block_info(
            step.previous_block_info.as_ref(),
            self.world.previous_block_info.clone(),
        )?;
        self.world.current_block_info = merge_block_info(
            step.current_block_info.as_ref(),
            self.world.current_block_info.clone(),
        )?;
        self.world.block_hashes = step
            .block_hashes
            .iter()
            .map(|hash| hash.value.clone())
            .collect();

        for mock in &step.new_address_mocks {
            if !is_smart_contract_address(&mock.new_address.value) {
                return Err(ScenarioError::ValidationError(format!(
                    "address in \"setState\" \"newAddresses\" field should have SC format: {}",
                    mock.new_address.original_str()
                )));
            }
        }
        self.world
            .new_address_mocks
            .extend(step.new_address_mocks.iter().map(|mock| NewAddressMock {
                creator_address: mock.creator_address.value.clone(),
                creator_nonce: mock.creator_nonce.value,
                new_address: mock.new_address.value.clone(),
            }));
        Ok(())
    }

    /// Replaces the world account with the one described by the step
    pub(crate) fn put_new_account(
        &mut self,
        account: &scenario_account::Account,
    ) -> Result<(), ScenarioError> {
        let converted = convert_account(account)?;
        validate_set_state_account(account, &converted)?;
        self.world.accept_account(converted);
        Ok(())
    }

    /// Merges the specified fields into an existing world account
    pub(crate) fn update_account(
        &mut self,
        account: &scenario_account::Account,
    ) -> Result<(), ScenarioError> {
        let converted = convert_account(account)?;
        let mut existing = self
            .world
            .account(&account.address.value)
            .cloned()
            .ok_or(WorldError::AccountNotFound)?;

        existing.storage.extend(converted.storage);
        if account.nonce.is_some() {
            existing.nonce = converted.nonce;
        }
        if account.balance.is_some() {
            existing.balance = converted.balance;
        }
        if account.username.is_some() {
            existing.username = converted.username;
        }
        if account.owner.is_some() {
            existing.owner_address = converted.owner_address;
        }
        if account.code.is_some() {
            existing.set_code(converted.code);
            existing.code_metadata = converted.code_metadata;
        }
        if account.shard.is_some() {
            existing.shard_id = converted.shard_id;
        }
        existing.async_call_data = converted.async_call_data;
        validate_set_state_account(account, &existing)?;
        self.world.accept_account(existing);
        Ok(())
    }
}

/// World account described by a `setState` entry, tokens included
fn convert_account(account: &scenario_account::Account) -> Result<Account, ScenarioError> {
    if account.address.value.len() != ADDRESS_LENGTH {
        return Err(ScenarioError::ValidationError(
            "bad test: account address should be 32 bytes long".to_string(),
        ));
    }
    let mut converted = Account::new(account.address.value.clone());
    for entry in &account.storage {
        converted
            .storage
            .insert(entry.key.value.clone(), entry.value.value.clone());
    }
    for esdt in &account.esdt {
        write_esdt_to_storage(esdt, &mut converted)?;
    }

    converted.nonce = account.nonce.as_ref().map_or(0, |nonce| nonce.value);
    converted.balance = account
        .balance
        .as_ref()
        .map(|balance| balance.value.clone())
        .unwrap_or_default();
    converted.developer_reward = account
        .developer_reward
        .as_ref()
        .map(|reward| reward.value.clone())
        .unwrap_or_default();
    converted.username = parsed_bytes(&account.username);
    converted.owner_address = parsed_bytes(&account.owner);
    converted.async_call_data = parsed_bytes(&account.async_call_data);
    converted.shard_id = match &account.shard {
        Some(shard) => narrow_u32(shard, "shard")?,
        None => 0,
    };

    let code = parsed_bytes(&account.code);
    converted.code_metadata = match &account.code_metadata {
        Some(metadata) => metadata.value.clone(),
        None if !code.is_empty() => DEFAULT_CODE_METADATA.to_vec(),
        None => Vec::new(),
    };
    converted.set_code(code);
    Ok(converted)
}

fn narrow_u32(value: &Parsed<u64>, field: &str) -> Result<u32, ScenarioError> {
    u32::try_from(value.value).map_err(|_| {
        ScenarioError::ValidationError(format!(
            "bad test: {} does not fit in 32 bits: {}",
            field,
            value.original_str()
        ))
    })
}

fn parsed_bytes(value: &Option<Parsed<Vec<u8>>>) -> Vec<u8> {
    value
        .as_ref()
        .map(|parsed| parsed.value.clone())
        .unwrap_or_default()
}

fn validate_set_state_account(
    account: &scenario_account::Account,
    converted: &Account,
) -> Result<(), ScenarioError> {
    converted.validate().map_err(|err| {
        ScenarioError::ValidationError(format!(
            "\"setState\" step validation failed for account \"{}\": {}",
            account.address.original_str(),
            err
        ))
    })
}

/// Writes the instances, last nonce and roles of a token under the
/// protected ESDT keys of the account storage
fn write_esdt_to_storage(esdt: &EsdtData, account: &mut Account) -> Result<(), ScenarioError> {
    let token_identifier = &esdt.token_identifier.value;
    let frozen = esdt.frozen.as_ref().map_or(false, |frozen| frozen.value != 0);
    for instance in &esdt.instances {
        let nonce = instance.nonce.value;
        let royalties = match &instance.royalties {
            Some(royalties) => narrow_u32(royalties, "royalties")?,
            None => 0,
        };
        let metadata = (nonce != 0).then(|| EsdtMetadata {
            nonce,
            name: token_identifier.clone(),
            creator: parsed_bytes(&instance.creator),
            royalties,
            hash: parsed_bytes(&instance.hash),
            uris: instance.uris.iter().map(|uri| uri.value.clone()).collect(),
            attributes: parsed_bytes(&instance.attributes),
        });
        let token = EsdtToken {
            token_type: if nonce == 0 {
                EsdtTokenType::Fungible
            } else {
                EsdtTokenType::NonFungible
            },
            value: instance.balance.value.clone(),
            properties: if frozen { vec![1] } else { Vec::new() },
            metadata,
        };
        account.save_esdt_token(token_identifier, nonce, &token)?;
    }
    if let Some(last_nonce) = &esdt.last_nonce {
        account.set_esdt_last_nonce(token_identifier, last_nonce.value);
    }
    let roles: Vec<Vec<u8>> = esdt
        .roles
        .iter()
        .map(|role| role.as_bytes().to_vec())
        .collect();
    account.set_esdt_roles(token_identifier, &roles)?;
    Ok(())
}

/// Overwrites only the block info fields the step sets
fn merge_block_info(
    step_block_info: Option<&scenario_account::BlockInfo>,
    current: Option<BlockInfo>,
) -> Result<Option<BlockInfo>, ScenarioError> {
    let Some(step_block_info) = step_block_info else {
        return Ok(current);
    };
    let mut merged = current.unwrap_or_default();
    if let Some(timestamp) = &step_block_info.block_timestamp {
        merged.timestamp = timestamp.value;
    }
    if let Some(nonce) = &step_block_info.block_nonce {
        merged.nonce = nonce.value;
    }
    if let Some(round) = &step_block_info.block_round {
        merged.round = round.value;
    }
    if let Some(epoch) = &step_block_info.block_epoch {
        merged.epoch = narrow_u32(epoch, "block epoch")?;
    }
    if let Some(random_seed) = &step_block_info.block_random_seed {
        merged.set_random_seed(&random_seed.value);
    }
    Ok(Some(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parsed_address(name: &str) -> Parsed<Vec<u8>> {
        let mut address = name.as_bytes().to_vec();
        address.resize(ADDRESS_LENGTH, b'_');
        Parsed::new(address, json!(format!("address:{}", name)))
    }

    #[test]
    fn test_block_info_merge_keeps_unset_fields() {
        let current = BlockInfo {
            nonce: 7,
            round: 3,
            ..Default::default()
        };
        let step = scenario_account::BlockInfo {
            block_round: Some(Parsed::new(9, json!("9"))),
            block_random_seed: Some(Parsed::new(vec![1, 2], json!("0x0102"))),
            ..Default::default()
        };
        let merged = merge_block_info(Some(&step), Some(current.clone()))
            .unwrap()
            .unwrap();
        assert_eq!(merged.nonce, 7);
        assert_eq!(merged.round, 9);
        assert_eq!(&merged.random_seed[..3], &[1, 2, 0]);
        assert_eq!(
            merge_block_info(None, Some(current.clone())).unwrap(),
            Some(current.clone())
        );
        assert_eq!(merge_block_info(None, None).unwrap(), None);

        let step = scenario_account::BlockInfo {
            block_epoch: Some(Parsed::new(u64::from(u32::MAX) + 1, json!("4294967296"))),
            ..Default::default()
        };
        let err = merge_block_info(Some(&step), Some(current)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad test: block epoch does not fit in 32 bits: 4294967296"
        );
    }

    #[test]
    fn test_convert_account_defaults() {
        let mut account = scenario_account::Account::new(parsed_address("user"));
        account.storage.push(scenario_account::StorageKeyValue {
            key: Parsed::new(b"key".to_vec(), json!("str:key")),
            value: Parsed::new(b"value".to_vec(), json!("str:value")),
        });
        let converted = convert_account(&account).unwrap();
        assert_eq!(converted.nonce, 0);
        assert!(converted.code_metadata.is_empty());
        assert_eq!(converted.storage_value(b"key"), b"value".to_vec());

        account.address = Parsed::new(b"short".to_vec(), json!("str:short"));
        assert_eq!(
            convert_account(&account).unwrap_err().to_string(),
            "bad test: account address should be 32 bytes long"
        );
    }
}
