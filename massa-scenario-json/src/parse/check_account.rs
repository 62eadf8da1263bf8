// Copyright (c) 2022 MASSA LABS <info@massa.net>

use serde_json::Value;

use massa_scenario_exports::ScenarioError;
use massa_scenario_models::account::{
    CheckAccount, CheckAccounts, CheckEsdt, CheckStorage, CheckStorageEntry,
};
use massa_scenario_models::{Check, Parsed};

use super::value::{context, is_star, parse_string};
use super::{parse_error, Parser};

/// Map key allowing entries that are not listed
const MORE_ALLOWED_KEY: &str = "+";

impl Parser {
    /// Accounts map of a `checkState` step
    pub(super) fn process_check_accounts(
        &self,
        value: &Value,
    ) -> Result<CheckAccounts, ScenarioError> {
        let accounts = value.as_object().ok_or_else(|| {
            parse_error("unmarshalled check accounts object is not a map".to_string())
        })?;
        let mut result = CheckAccounts::default();
        for (address, account) in accounts {
            if address == MORE_ALLOWED_KEY {
                result.more_accounts_allowed = true;
                continue;
            }
            let address = self.account_address(&Value::String(address.clone()))?;
            result
                .accounts
                .push(self.process_check_account(address, account)?);
        }
        Ok(result)
    }

    /// Absent `storage` and `esdt` sections are not checked
    fn process_check_account(
        &self,
        address: Parsed<Vec<u8>>,
        value: &Value,
    ) -> Result<CheckAccount, ScenarioError> {
        let fields = value.as_object().ok_or_else(|| {
            parse_error("unmarshalled check account object is not a map".to_string())
        })?;
        let mut account = CheckAccount::new(address);
        account.storage = CheckStorage::Ignore;
        account.esdt = CheckEsdt::Ignore;
        for (key, value) in fields {
            match key.as_str() {
                "comment" => {
                    account.comment =
                        Some(parse_string(value).map_err(context("invalid account comment"))?)
                }
                "nonce" => {
                    account.nonce = self
                        .check_uint64(value)
                        .map_err(context("invalid account nonce"))?
                }
                "balance" => {
                    account.balance = self
                        .check_big_uint(value)
                        .map_err(context("invalid account balance"))?
                }
                "esdt" => {
                    account.esdt = self
                        .process_check_esdt(value)
                        .map_err(context("invalid check ESDT"))?
                }
                "username" => {
                    account.username = self
                        .check_bytes(value)
                        .map_err(context("invalid account username"))?
                }
                "storage" => {
                    account.storage = self
                        .process_check_storage(value)
                        .map_err(context("invalid account storage"))?
                }
                "code" => {
                    account.code = self
                        .check_bytes(value)
                        .map_err(context("invalid account code"))?
                }
                "codeMetadata" => {
                    account.code_metadata = self
                        .check_bytes(value)
                        .map_err(context("invalid account code metadata"))?
                }
                "owner" => {
                    account.owner = self
                        .check_bytes(value)
                        .map_err(context("invalid account owner"))?
                }
                "developerRewards" => {
                    account.developer_reward = self
                        .check_big_uint(value)
                        .map_err(context("invalid account developer rewards"))?
                }
                "asyncCallData" => {
                    let data = parse_string(value).map_err(context("invalid asyncCallData"))?;
                    account.async_call_data = if data == "*" {
                        Check::Star
                    } else {
                        Check::value(data.into_bytes(), value.clone())
                    };
                }
                _ => return Err(parse_error(format!("unknown check account field: {}", key))),
            }
        }
        Ok(account)
    }

    fn process_check_storage(&self, value: &Value) -> Result<CheckStorage, ScenarioError> {
        if is_star(value) {
            return Ok(CheckStorage::Ignore);
        }
        let storage = value
            .as_object()
            .ok_or_else(|| parse_error("not a JSON map".to_string()))?;
        let mut entries = Vec::with_capacity(storage.len());
        let mut more_allowed = false;
        for (key, value) in storage {
            if key == MORE_ALLOWED_KEY {
                more_allowed = true;
                continue;
            }
            let key = self
                .bytes_from_string(&Value::String(key.clone()))
                .map_err(context("invalid account storage key"))?;
            let value = self
                .check_bytes(value)
                .map_err(context("invalid account storage value"))?;
            entries.push(CheckStorageEntry { key, value });
        }
        Ok(CheckStorage::Entries {
            entries,
            more_allowed,
        })
    }

    fn process_check_esdt(&self, value: &Value) -> Result<CheckEsdt, ScenarioError> {
        if is_star(value) {
            return Ok(CheckEsdt::Ignore);
        }
        let tokens_map = value
            .as_object()
            .ok_or_else(|| parse_error("not a JSON map".to_string()))?;
        let mut tokens = Vec::with_capacity(tokens_map.len());
        let mut more_allowed = false;
        for (token, data) in tokens_map {
            if token == MORE_ALLOWED_KEY {
                more_allowed = true;
                continue;
            }
            let token = self
                .bytes_from_string(&Value::String(token.clone()))
                .map_err(context("invalid ESDT token name"))?;
            tokens.push(self.process_check_esdt_data(token, data)?);
        }
        Ok(CheckEsdt::Tokens {
            tokens,
            more_allowed,
        })
    }
}
