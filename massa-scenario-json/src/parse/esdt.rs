// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! ESDT sections of `setState` and `checkState` accounts.
//!
//! A token is either a plain balance string (fungible, nonce 0) or a map
//! with `instances`, `lastNonce`, `roles` and `frozen`. Instance fields
//! written directly in the token map describe a first instance.

use serde_json::Value;

use massa_scenario_exports::ScenarioError;
use massa_scenario_models::account::{CheckEsdtData, CheckEsdtInstance, EsdtData, EsdtInstance};
use massa_scenario_models::{Check, Parsed};

use super::value::{context, parse_string_list};
use super::{parse_error, Parser};

const MAX_ROYALTIES: u64 = 10000;

fn zero_nonce() -> Parsed<u64> {
    Parsed::new(0, Value::String(String::new()))
}

fn empty_instance() -> EsdtInstance {
    EsdtInstance {
        nonce: zero_nonce(),
        balance: Parsed::new(Default::default(), Value::String(String::new())),
        creator: None,
        royalties: None,
        hash: None,
        uris: Vec::new(),
        attributes: None,
    }
}

fn check_royalties(royalties: u64) -> Result<(), ScenarioError> {
    if royalties > MAX_ROYALTIES {
        return Err(parse_error(format!(
            "invalid ESDT NFT royalties: value exceeds maximum allowed {}",
            MAX_ROYALTIES
        )));
    }
    Ok(())
}

impl Parser {
    pub(super) fn process_esdt_data(
        &self,
        token_identifier: Parsed<Vec<u8>>,
        value: &Value,
    ) -> Result<EsdtData, ScenarioError> {
        let mut data = EsdtData {
            token_identifier,
            instances: Vec::new(),
            last_nonce: None,
            roles: Vec::new(),
            frozen: None,
        };
        match value {
            Value::String(_) => {
                let balance = self.big_uint(value).map_err(context("invalid ESDT balance"))?;
                data.instances.push(EsdtInstance {
                    balance,
                    ..empty_instance()
                });
                Ok(data)
            }
            Value::Object(fields) => {
                let mut first_instance = empty_instance();
                let mut first_instance_loaded = false;
                let mut explicit_instances = Vec::new();
                for (key, value) in fields {
                    if self
                        .try_process_esdt_instance_field(key, value, &mut first_instance)
                        .map_err(context("invalid account ESDT instance field"))?
                    {
                        first_instance_loaded = true;
                        continue;
                    }
                    match key.as_str() {
                        "instances" => {
                            explicit_instances = self
                                .process_esdt_instances(value)
                                .map_err(context("invalid account ESDT instances"))?
                        }
                        "lastNonce" => {
                            data.last_nonce = Some(
                                self.uint64(value)
                                    .map_err(context("invalid account ESDT lastNonce"))?,
                            )
                        }
                        "roles" => {
                            data.roles = parse_string_list(value)
                                .map_err(context("invalid account ESDT roles"))?
                        }
                        "frozen" => {
                            data.frozen =
                                Some(self.uint64(value).map_err(context("invalid ESDT frozen flag"))?)
                        }
                        _ => return Err(parse_error(format!("unknown ESDT data field: {}", key))),
                    }
                }
                if first_instance_loaded {
                    data.instances.push(first_instance);
                }
                data.instances.extend(explicit_instances);
                Ok(data)
            }
            _ => Err(parse_error("invalid JSON object for ESDT".to_string())),
        }
    }

    fn process_esdt_instances(&self, value: &Value) -> Result<Vec<EsdtInstance>, ScenarioError> {
        let list = value
            .as_array()
            .ok_or_else(|| parse_error("esdt instances object is not a list".to_string()))?;
        let mut result = Vec::with_capacity(list.len());
        for item in list {
            let fields = item.as_object().ok_or_else(|| {
                parse_error("JSON map expected as esdt instances list item".to_string())
            })?;
            let mut instance = empty_instance();
            for (key, value) in fields {
                if !self.try_process_esdt_instance_field(key, value, &mut instance)? {
                    return Err(parse_error(format!(
                        "invalid account ESDT instance field in instances list: `{}`",
                        key
                    )));
                }
            }
            result.push(instance);
        }
        Ok(result)
    }

    /// Returns false if `key` is not an instance field
    fn try_process_esdt_instance_field(
        &self,
        key: &str,
        value: &Value,
        instance: &mut EsdtInstance,
    ) -> Result<bool, ScenarioError> {
        match key {
            "nonce" => instance.nonce = self.uint64(value).map_err(context("invalid account nonce"))?,
            "balance" => {
                instance.balance = self.big_uint(value).map_err(context("invalid ESDT balance"))?
            }
            "creator" => {
                instance.creator = Some(
                    self.bytes_from_string(value)
                        .map_err(context("invalid ESDT NFT creator address"))?,
                )
            }
            "royalties" => {
                let royalties = self.uint64(value).map_err(context("invalid ESDT NFT royalties"))?;
                check_royalties(royalties.value)?;
                instance.royalties = Some(royalties);
            }
            "hash" => {
                instance.hash =
                    Some(self.bytes_from_string(value).map_err(context("invalid ESDT NFT hash"))?)
            }
            "uri" => {
                instance.uris = match value {
                    Value::Array(_) => self.sub_tree_list(value).map_err(context("invalid ESDT NFT URI"))?,
                    Value::String(text) if text.is_empty() => Vec::new(),
                    _ => vec![self.bytes_from_tree(value).map_err(context("invalid ESDT NFT URI"))?],
                }
            }
            "attributes" => {
                instance.attributes = Some(
                    self.bytes_from_tree(value)
                        .map_err(context("invalid ESDT NFT attributes"))?,
                )
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub(super) fn process_check_esdt_data(
        &self,
        token_identifier: Parsed<Vec<u8>>,
        value: &Value,
    ) -> Result<CheckEsdtData, ScenarioError> {
        let mut data = CheckEsdtData {
            token_identifier,
            instances: Vec::new(),
            last_nonce: Check::Unspecified,
            roles: Vec::new(),
            frozen: Check::Unspecified,
        };
        match value {
            Value::String(_) => {
                let mut instance = CheckEsdtInstance::zero_balance(zero_nonce());
                instance.balance = self
                    .check_big_uint(value)
                    .map_err(context("invalid ESDT balance"))?;
                data.instances.push(instance);
                Ok(data)
            }
            Value::Object(fields) => {
                let mut first_instance = unspecified_check_instance();
                let mut first_instance_loaded = false;
                let mut explicit_instances = Vec::new();
                for (key, value) in fields {
                    if self
                        .try_process_check_esdt_instance_field(key, value, &mut first_instance)
                        .map_err(context("invalid account ESDT instance field"))?
                    {
                        first_instance_loaded = true;
                        continue;
                    }
                    match key.as_str() {
                        "instances" => {
                            explicit_instances = self
                                .process_check_esdt_instances(value)
                                .map_err(context("invalid account ESDT instances"))?
                        }
                        "lastNonce" => {
                            data.last_nonce = self
                                .check_uint64(value)
                                .map_err(context("invalid account ESDT lastNonce"))?
                        }
                        "roles" => {
                            data.roles = parse_string_list(value)
                                .map_err(context("invalid account ESDT roles"))?
                        }
                        "frozen" => {
                            data.frozen = self
                                .check_uint64(value)
                                .map_err(context("invalid ESDT frozen flag"))?
                        }
                        _ => return Err(parse_error(format!("unknown ESDT data field: {}", key))),
                    }
                }
                if first_instance_loaded {
                    data.instances.push(first_instance);
                }
                data.instances.extend(explicit_instances);
                Ok(data)
            }
            _ => Err(parse_error("invalid JSON object for ESDT".to_string())),
        }
    }

    fn process_check_esdt_instances(
        &self,
        value: &Value,
    ) -> Result<Vec<CheckEsdtInstance>, ScenarioError> {
        let list = value
            .as_array()
            .ok_or_else(|| parse_error("esdt instances object is not a list".to_string()))?;
        let mut result = Vec::with_capacity(list.len());
        for item in list {
            let fields = item.as_object().ok_or_else(|| {
                parse_error("JSON map expected as esdt instances list item".to_string())
            })?;
            let mut instance = unspecified_check_instance();
            for (key, value) in fields {
                if !self
                    .try_process_check_esdt_instance_field(key, value, &mut instance)
                    .map_err(context("invalid account ESDT instance field in instances list"))?
                {
                    return Err(parse_error(format!(
                        "invalid account ESDT instance field in instances list: `{}`",
                        key
                    )));
                }
            }
            result.push(instance);
        }
        Ok(result)
    }

    fn try_process_check_esdt_instance_field(
        &self,
        key: &str,
        value: &Value,
        instance: &mut CheckEsdtInstance,
    ) -> Result<bool, ScenarioError> {
        match key {
            "nonce" => instance.nonce = self.uint64(value).map_err(context("invalid account nonce"))?,
            "balance" => {
                instance.balance = self
                    .check_big_uint(value)
                    .map_err(context("invalid ESDT balance"))?
            }
            "creator" => {
                instance.creator = self
                    .check_bytes(value)
                    .map_err(context("invalid ESDT NFT creator address"))?
            }
            "royalties" => {
                let royalties = self
                    .check_uint64(value)
                    .map_err(context("invalid ESDT NFT royalties"))?;
                if let Some(royalties) = royalties.expected() {
                    check_royalties(*royalties)?;
                }
                instance.royalties = royalties;
            }
            "hash" => {
                instance.hash = self
                    .check_bytes(value)
                    .map_err(context("invalid ESDT NFT hash"))?
            }
            "uri" => {
                instance.uris = self
                    .check_value_list(value)
                    .map_err(context("invalid ESDT NFT URI"))?
            }
            "attributes" => {
                instance.attributes = self
                    .check_bytes(value)
                    .map_err(context("invalid ESDT NFT attributes"))?
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn unspecified_check_instance() -> CheckEsdtInstance {
    CheckEsdtInstance {
        balance: Check::Unspecified,
        ..CheckEsdtInstance::zero_balance(zero_nonce())
    }
}
