// Copyright (c) 2022 MASSA LABS <info@massa.net>

use serde_json::Value;

use massa_scenario_exports::ScenarioError;
use massa_scenario_models::account::{Account, BlockInfo, NewAddressMock, StorageKeyValue};
use massa_scenario_models::Parsed;

use super::value::{context, parse_bool, parse_string};
use super::{parse_error, Parser};

impl Parser {
    /// Accounts map of a `setState` step, keyed by address expression
    pub(super) fn process_accounts(&self, value: &Value) -> Result<Vec<Account>, ScenarioError> {
        let accounts = value
            .as_object()
            .ok_or_else(|| parse_error("unmarshalled accounts object is not a map".to_string()))?;
        let mut result = Vec::with_capacity(accounts.len());
        for (address, account) in accounts {
            let address = self.account_address(&Value::String(address.clone()))?;
            result.push(self.process_account(address, account)?);
        }
        Ok(result)
    }

    fn process_account(
        &self,
        address: Parsed<Vec<u8>>,
        value: &Value,
    ) -> Result<Account, ScenarioError> {
        let fields = value
            .as_object()
            .ok_or_else(|| parse_error("unmarshalled account object is not a map".to_string()))?;
        let mut account = Account::new(address);
        for (key, value) in fields {
            match key.as_str() {
                "comment" => {
                    account.comment = Some(parse_string(value).map_err(context("invalid account comment"))?)
                }
                "update" => {
                    account.update = parse_bool(value).map_err(context("invalid account update flag"))?
                }
                "nonce" => {
                    account.nonce = Some(self.uint64(value).map_err(context("invalid account nonce"))?)
                }
                "balance" => {
                    account.balance =
                        Some(self.big_uint(value).map_err(context("invalid account balance"))?)
                }
                "esdt" => {
                    let tokens = value.as_object().ok_or_else(|| {
                        parse_error("invalid ESDT map: not a JSON map".to_string())
                    })?;
                    for (token, data) in tokens {
                        let token = self
                            .bytes_from_string(&Value::String(token.clone()))
                            .map_err(context("invalid ESDT token name"))?;
                        account.esdt.push(
                            self.process_esdt_data(token, data)
                                .map_err(context("invalid ESDT data"))?,
                        );
                    }
                }
                "username" => {
                    account.username =
                        Some(self.bytes_from_string(value).map_err(context("invalid account username"))?)
                }
                "storage" => {
                    let storage = value
                        .as_object()
                        .ok_or_else(|| parse_error("invalid account storage".to_string()))?;
                    for (key, value) in storage {
                        let key = self
                            .bytes_from_string(&Value::String(key.clone()))
                            .map_err(context("invalid account storage key"))?;
                        let value = self
                            .bytes_from_tree(value)
                            .map_err(context("invalid account storage value"))?;
                        account.storage.push(StorageKeyValue { key, value });
                    }
                }
                "code" => {
                    account.code =
                        Some(self.bytes_from_string(value).map_err(context("invalid account code"))?)
                }
                "codeMetadata" => {
                    account.code_metadata = Some(
                        self.bytes_from_string(value)
                            .map_err(context("invalid account code metadata"))?,
                    )
                }
                "owner" => {
                    account.owner =
                        Some(self.bytes_from_string(value).map_err(context("invalid account owner"))?)
                }
                "developerRewards" => {
                    account.developer_reward = Some(
                        self.big_uint(value)
                            .map_err(context("invalid account developer rewards"))?,
                    )
                }
                "shard" => {
                    account.shard = Some(self.uint64(value).map_err(context("invalid account shard"))?)
                }
                "asyncCallData" => {
                    let data = parse_string(value).map_err(context("invalid asyncCallData string"))?;
                    account.async_call_data = Some(Parsed::new(data.into_bytes(), value.clone()));
                }
                _ => return Err(parse_error(format!("unknown account field: {}", key))),
            }
        }
        Ok(account)
    }

    /// `previousBlockInfo` / `currentBlockInfo`; empty strings leave a field unset
    pub(super) fn process_block_info(&self, value: &Value) -> Result<BlockInfo, ScenarioError> {
        let fields = value
            .as_object()
            .ok_or_else(|| parse_error("unmarshalled block info object is not a map".to_string()))?;
        let mut block_info = BlockInfo::default();
        for (key, value) in fields {
            if value.as_str() == Some("") {
                continue;
            }
            match key.as_str() {
                "blockTimestamp" => {
                    block_info.block_timestamp =
                        Some(self.uint64(value).map_err(context("invalid blockTimestamp"))?)
                }
                "blockNonce" => {
                    block_info.block_nonce =
                        Some(self.uint64(value).map_err(context("invalid blockNonce"))?)
                }
                "blockRound" => {
                    block_info.block_round =
                        Some(self.uint64(value).map_err(context("invalid blockRound"))?)
                }
                "blockEpoch" => {
                    block_info.block_epoch =
                        Some(self.uint64(value).map_err(context("invalid blockEpoch"))?)
                }
                "blockRandomSeed" => {
                    block_info.block_random_seed =
                        Some(self.bytes_from_tree(value).map_err(context("invalid blockRandomSeed"))?)
                }
                _ => return Err(parse_error(format!("unknown block info field: {}", key))),
            }
        }
        Ok(block_info)
    }

    /// `newAddresses` list of a `setState` step
    pub(super) fn process_new_addresses(
        &self,
        value: &Value,
    ) -> Result<Vec<NewAddressMock>, ScenarioError> {
        let list = value
            .as_array()
            .ok_or_else(|| parse_error("new addresses object is not a list".to_string()))?;
        let mut result = Vec::with_capacity(list.len());
        for item in list {
            let fields = item
                .as_object()
                .ok_or_else(|| parse_error("new address entry is not a map".to_string()))?;
            let mut creator_address = None;
            let mut creator_nonce = None;
            let mut new_address = None;
            for (key, value) in fields {
                match key.as_str() {
                    "creatorAddress" => {
                        creator_address = Some(
                            self.account_address(value)
                                .map_err(context("invalid creator address"))?,
                        )
                    }
                    "creatorNonce" => {
                        creator_nonce =
                            Some(self.uint64(value).map_err(context("invalid creator nonce"))?)
                    }
                    "newAddress" => {
                        new_address = Some(
                            self.account_address(value)
                                .map_err(context("invalid new address"))?,
                        )
                    }
                    _ => return Err(parse_error(format!("unknown new address field: {}", key))),
                }
            }
            match (creator_address, creator_nonce, new_address) {
                (Some(creator_address), Some(creator_nonce), Some(new_address)) => {
                    result.push(NewAddressMock {
                        creator_address,
                        creator_nonce,
                        new_address,
                    })
                }
                _ => {
                    return Err(parse_error(
                        "new address entry requires creatorAddress, creatorNonce and newAddress"
                            .to_string(),
                    ))
                }
            }
        }
        Ok(result)
    }
}
