// Copyright (c) 2022 MASSA LABS <info@massa.net>

use serde_json::{json, Map, Value};

use massa_scenario_exports::ScenarioError;
use massa_scenario_logging::massa_scenario_trace;
use massa_scenario_models::address::PROTECTED_KEY_PREFIX;
use massa_scenario_models::scenario::DumpStateStep;
use massa_scenario_models::ReconstructorHint;
use massa_scenario_world::esdt::FullEsdtData;
use massa_scenario_world::Account;

use crate::executor::ScenarioExecutor;

impl ScenarioExecutor {
    pub(crate) fn execute_dump_state_step(&mut self, step: &DumpStateStep) -> Result<(), ScenarioError> {
        massa_scenario_trace!("dump_state_step", { "comment": step.comment });
        let accounts = self.world_state_json()?;
        let dump = serde_json::to_string_pretty(&accounts)
            .map_err(|err| ScenarioError::ExecutionError(format!("could not dump world state: {}", err)))?;
        println!("world state dump:\n{}", dump);
        Ok(())
    }

    /// The accounts of the world, in `setState` format
    pub(crate) fn world_state_json(&self) -> Result<Value, ScenarioError> {
        let mut accounts = Map::new();
        for (address, account) in self.world.accounts.iter() {
            let tokens = self.world.full_esdt_data(address)?;
            accounts.insert(
                self.reconstructor
                    .reconstruct(address, ReconstructorHint::Address),
                self.account_json(account, tokens.values().collect()),
            );
        }
        Ok(Value::Object(accounts))
    }

    fn account_json(&self, account: &Account, tokens: Vec<&FullEsdtData>) -> Value {
        let mut fields = Map::new();
        fields.insert("nonce".to_string(), json!(account.nonce.to_string()));
        fields.insert("balance".to_string(), json!(account.balance.to_string()));

        if !tokens.is_empty() {
            let esdt: Map<String, Value> = tokens
                .into_iter()
                .map(|token| {
                    (
                        format!("str:{}", String::from_utf8_lossy(&token.token_identifier)),
                        self.token_json(token),
                    )
                })
                .collect();
            fields.insert("esdt".to_string(), Value::Object(esdt));
        }

        let storage: Map<String, Value> = account
            .storage
            .iter()
            .filter(|(key, value)| !key.starts_with(PROTECTED_KEY_PREFIX) && !value.is_empty())
            .map(|(key, value)| {
                (
                    self.reconstructor.reconstruct(key, ReconstructorHint::NoHint),
                    json!(self.reconstructor.reconstruct(value, ReconstructorHint::NoHint)),
                )
            })
            .collect();
        fields.insert("storage".to_string(), Value::Object(storage));

        if !account.owner_address.is_empty() {
            fields.insert(
                "owner".to_string(),
                json!(self
                    .reconstructor
                    .reconstruct(&account.owner_address, ReconstructorHint::Address)),
            );
        }
        Value::Object(fields)
    }

    fn token_json(&self, token: &FullEsdtData) -> Value {
        let instances: Vec<Value> = token
            .instances
            .iter()
            .map(|(nonce, instance)| {
                let mut fields = Map::new();
                fields.insert("nonce".to_string(), json!(nonce.to_string()));
                fields.insert("balance".to_string(), json!(instance.value.to_string()));
                if let Some(metadata) = &instance.metadata {
                    if !metadata.creator.is_empty() {
                        fields.insert(
                            "creator".to_string(),
                            json!(self
                                .reconstructor
                                .reconstruct(&metadata.creator, ReconstructorHint::Address)),
                        );
                    }
                    if metadata.royalties > 0 {
                        fields.insert("royalties".to_string(), json!(metadata.royalties.to_string()));
                    }
                    if !metadata.hash.is_empty() {
                        fields.insert(
                            "hash".to_string(),
                            json!(self
                                .reconstructor
                                .reconstruct(&metadata.hash, ReconstructorHint::NoHint)),
                        );
                    }
                    if !metadata.uris.is_empty() {
                        let uris: Vec<String> = metadata
                            .uris
                            .iter()
                            .map(|uri| self.reconstructor.reconstruct(uri, ReconstructorHint::Str))
                            .collect();
                        fields.insert("uri".to_string(), json!(uris));
                    }
                    if !metadata.attributes.is_empty() {
                        fields.insert(
                            "attributes".to_string(),
                            json!(self
                                .reconstructor
                                .reconstruct(&metadata.attributes, ReconstructorHint::NoHint)),
                        );
                    }
                }
                Value::Object(fields)
            })
            .collect();

        let mut fields = Map::new();
        fields.insert("instances".to_string(), Value::Array(instances));
        if token.last_nonce > 0 {
            fields.insert("lastNonce".to_string(), json!(token.last_nonce.to_string()));
        }
        if !token.roles.is_empty() {
            let roles: Vec<String> = token
                .roles
                .iter()
                .map(|role| String::from_utf8_lossy(role).into_owned())
                .collect();
            fields.insert("roles".to_string(), json!(roles));
        }
        if token.frozen {
            fields.insert("frozen".to_string(), json!("true"));
        }
        Value::Object(fields)
    }
}
