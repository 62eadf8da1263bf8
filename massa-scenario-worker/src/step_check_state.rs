// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::collections::{BTreeMap, BTreeSet};

use num::BigUint;

use massa_scenario_exports::ScenarioError;
use massa_scenario_logging::massa_scenario_trace;
use massa_scenario_models::account::{
    CheckAccount, CheckAccounts, CheckEsdt, CheckEsdtData, CheckEsdtInstance, CheckStorage,
};
use massa_scenario_models::address::{PROTECTED_KEY_PREFIX, SYSTEM_ACCOUNT_ADDRESS};
use massa_scenario_models::scenario::CheckStateStep;
use massa_scenario_models::{Check, Parsed, ReconstructorHint};
use massa_scenario_world::esdt::{EsdtMetadata, FullEsdtData};
use massa_scenario_world::Account;

use crate::executor::ScenarioExecutor;

fn check_state_base_error_message(step: &CheckStateStep) -> String {
    if step.check_state_ident.is_empty() {
        "Check state:".to_string()
    } else {
        format!("Check state \"{}\":", step.check_state_ident)
    }
}

impl ScenarioExecutor {
    /// Compares the world with the expected accounts.
    ///
    /// Every mismatch is reported, one line each, prefixed with the name of
    /// the step.
    pub(crate) fn execute_check_state_step(
        &mut self,
        step: &CheckStateStep,
    ) -> Result<(), ScenarioError> {
        massa_scenario_trace!("check_state_step", {
            "id": step.check_state_ident,
            "comment": step.comment
        });
        let base = check_state_base_error_message(step);
        let mismatches = self.check_accounts(&step.check_accounts)?;
        if mismatches.is_empty() {
            return Ok(());
        }
        Err(ScenarioError::CheckStateError(
            mismatches
                .iter()
                .map(|mismatch| format!("{} {}", base, mismatch))
                .collect::<Vec<_>>()
                .join("\n"),
        ))
    }

    fn check_accounts(&self, check_accounts: &CheckAccounts) -> Result<Vec<String>, ScenarioError> {
        let mut mismatches = Vec::new();
        if !check_accounts.more_accounts_allowed {
            for address in self.world.accounts.addresses() {
                if address.as_slice() == SYSTEM_ACCOUNT_ADDRESS.as_slice() {
                    continue;
                }
                let expected = check_accounts
                    .accounts
                    .iter()
                    .any(|account| &account.address.value == address);
                if !expected {
                    mismatches.push(format!(
                        "unexpected account address: {}",
                        self.reconstructor
                            .reconstruct(address, ReconstructorHint::Address)
                    ));
                }
            }
        }

        for expected in &check_accounts.accounts {
            let Some(account) = self.world.account(&expected.address.value) else {
                mismatches.push(format!(
                    "account {} expected but not found after running test",
                    expected.address.original_str()
                ));
                continue;
            };
            self.check_account_fields(expected, account, &mut mismatches);
            if let Some(mismatch) = self.check_account_storage(expected, account) {
                mismatches.push(mismatch);
            }
            if let Some(mismatch) = self.check_account_esdt(expected)? {
                mismatches.push(mismatch);
            }
        }
        Ok(mismatches)
    }

    fn check_account_fields(
        &self,
        expected: &CheckAccount,
        account: &Account,
        mismatches: &mut Vec<String>,
    ) {
        let address = expected.address.original_str();
        if !expected.nonce.check(&account.nonce) {
            mismatches.push(format!(
                "bad account nonce. Account: {}. Want: \"{}\". Have: \"{}\"",
                address,
                expected.nonce.original_str(),
                account.nonce
            ));
        }
        if !expected.balance.check(&account.balance) {
            mismatches.push(format!(
                "bad account balance. Account: {}. Want: \"{}\". Have: \"{}\"",
                address,
                expected.balance.original_str(),
                account.balance
            ));
        }
        if !expected.username.check(account.username.as_slice()) {
            mismatches.push(format!(
                "bad account username. Account: {}. Want: {}. Have: \"{}\"",
                address,
                expected.username.original_json(),
                self.reconstructor
                    .reconstruct(&account.username, ReconstructorHint::Str)
            ));
        }
        if !expected.code.check(account.code.as_slice()) {
            mismatches.push(format!(
                "bad account code. Account: {}. Want: {}. Have: \"{}\"",
                address,
                expected.code.original_json(),
                self.reconstructor
                    .reconstruct(&account.code, ReconstructorHint::Code)
            ));
        }
        if !expected.code_metadata.check(account.code_metadata.as_slice()) {
            mismatches.push(format!(
                "bad account code metadata. Account: {}. Want: {}. Have: \"0x{}\"",
                address,
                expected.code_metadata.original_json(),
                hex::encode(&account.code_metadata)
            ));
        }
        if !expected.owner.check(account.owner_address.as_slice()) {
            mismatches.push(format!(
                "bad account owner. Account: {}. Want: {}. Have: \"{}\"",
                address,
                expected.owner.original_json(),
                self.reconstructor
                    .reconstruct(&account.owner_address, ReconstructorHint::Address)
            ));
        }
        if !expected.developer_reward.check(&account.developer_reward) {
            mismatches.push(format!(
                "bad account developer rewards. Account: {}. Want: \"{}\". Have: \"{}\"",
                address,
                expected.developer_reward.original_str(),
                account.developer_reward
            ));
        }
        if !expected.async_call_data.check(account.async_call_data.as_slice()) {
            mismatches.push(format!(
                "bad async call data. Account: {}. Want: [{}]. Have: [{}]",
                address,
                expected.async_call_data.original_str(),
                String::from_utf8_lossy(&account.async_call_data)
            ));
        }
    }

    /// Storage slots are compared on the union of expected and actual keys.
    /// Unlisted slots must be empty unless more are allowed.
    fn check_account_storage(&self, expected: &CheckAccount, account: &Account) -> Option<String> {
        let CheckStorage::Entries {
            entries,
            more_allowed,
        } = &expected.storage
        else {
            return None;
        };
        let expected_storage: BTreeMap<&[u8], &Check<Vec<u8>>> = entries
            .iter()
            .map(|entry| (entry.key.value.as_slice(), &entry.value))
            .collect();
        let keys: BTreeSet<&[u8]> = expected_storage
            .keys()
            .copied()
            .chain(account.storage.keys().map(|key| key.as_slice()))
            .collect();

        let unlisted = if *more_allowed {
            Check::Star
        } else {
            Check::default_value(Vec::new())
        };
        let mut storage_errors = String::new();
        for key in keys {
            if key.starts_with(PROTECTED_KEY_PREFIX) {
                continue;
            }
            let want = expected_storage.get(key).copied().unwrap_or(&unlisted);
            let have = account.storage_value(key);
            if !want.check(have.as_slice()) {
                storage_errors.push_str(&format!(
                    "\n  for key {}: Want: {}. Have: \"{}\"",
                    self.reconstructor.reconstruct(key, ReconstructorHint::NoHint),
                    want.original_json(),
                    self.reconstructor.reconstruct(&have, ReconstructorHint::NoHint)
                ));
            }
        }
        if storage_errors.is_empty() {
            return None;
        }
        Some(format!(
            "wrong account storage for account \"{}\":{}",
            expected.address.original_str(),
            storage_errors
        ))
    }

    fn check_account_esdt(&self, expected: &CheckAccount) -> Result<Option<String>, ScenarioError> {
        let CheckEsdt::Tokens {
            tokens,
            more_allowed,
        } = &expected.esdt
        else {
            return Ok(None);
        };
        let address = expected.address.original_str();
        let expected_tokens: BTreeMap<&[u8], &CheckEsdtData> = tokens
            .iter()
            .map(|token| (token.token_identifier.value.as_slice(), token))
            .collect();
        let account_tokens = self.world.full_esdt_data(&expected.address.value)?;
        let token_names: BTreeSet<&[u8]> = expected_tokens
            .keys()
            .copied()
            .chain(account_tokens.keys().map(|name| name.as_slice()))
            .collect();

        let mut errors = Vec::new();
        for token_name in token_names {
            let unlisted;
            let expected_token = match expected_tokens.get(token_name) {
                Some(expected_token) => *expected_token,
                None if *more_allowed => continue,
                None => {
                    unlisted = unlisted_token(token_name);
                    &unlisted
                }
            };
            let empty;
            let account_token = match account_tokens.get(token_name) {
                Some(account_token) => account_token,
                None => {
                    empty = FullEsdtData {
                        token_identifier: token_name.to_vec(),
                        ..Default::default()
                    };
                    &empty
                }
            };
            let token = String::from_utf8_lossy(token_name);
            self.check_token_instances(&token, expected_token, account_token, &mut errors);
            check_token_properties(&address, &token, expected_token, account_token, &mut errors);
        }

        if errors.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!(
            "mismatch for account \"{}\":{}",
            address,
            errors
                .iter()
                .map(|error| format!("\n  {}", error))
                .collect::<String>()
        )))
    }

    fn check_token_instances(
        &self,
        token: &str,
        expected_token: &CheckEsdtData,
        account_token: &FullEsdtData,
        errors: &mut Vec<String>,
    ) {
        let expected_instances: BTreeMap<u64, &CheckEsdtInstance> = expected_token
            .instances
            .iter()
            .map(|instance| (instance.nonce.value, instance))
            .collect();
        let nonces: BTreeSet<u64> = expected_instances
            .keys()
            .chain(account_token.instances.keys())
            .copied()
            .collect();

        let no_metadata = EsdtMetadata::default();
        for nonce in nonces {
            let unlisted;
            let expected = match expected_instances.get(&nonce) {
                Some(expected) => *expected,
                None => {
                    unlisted = CheckEsdtInstance::zero_balance(Parsed::new(
                        nonce,
                        serde_json::Value::String(String::new()),
                    ));
                    &unlisted
                }
            };
            let (balance, metadata) = match account_token.instances.get(&nonce) {
                Some(instance) => (
                    instance.value.clone(),
                    instance.metadata.as_ref().unwrap_or(&no_metadata),
                ),
                None => (BigUint::default(), &no_metadata),
            };
            let prefix = format!("for token: {}, nonce: {}:", token, nonce);

            if !expected.balance.check(&balance) {
                errors.push(format!(
                    "{} Bad balance. Want: \"{}\". Have: \"{}\"",
                    prefix,
                    expected.balance.original_str(),
                    balance
                ));
            }
            if !expected.creator.check(metadata.creator.as_slice()) {
                errors.push(format!(
                    "{} Bad creator. Want: {}. Have: \"{}\"",
                    prefix,
                    expected.creator.original_json(),
                    self.reconstructor
                        .reconstruct(&metadata.creator, ReconstructorHint::Address)
                ));
            }
            if !expected.royalties.check(&u64::from(metadata.royalties)) {
                errors.push(format!(
                    "{} Bad royalties. Want: \"{}\". Have: \"{}\"",
                    prefix,
                    expected.royalties.original_str(),
                    metadata.royalties
                ));
            }
            if !expected.hash.check(metadata.hash.as_slice()) {
                errors.push(format!(
                    "{} Bad hash. Want: {}. Have: {}",
                    prefix,
                    expected.hash.original_json(),
                    self.reconstructor
                        .reconstruct(&metadata.hash, ReconstructorHint::NoHint)
                ));
            }
            if !expected.uris.check_list(&metadata.uris) {
                errors.push(format!(
                    "{} Bad URI. Want: [{}]. Have: {}",
                    prefix,
                    expected.uris.elements_json(),
                    self.reconstructor
                        .reconstruct_list(&metadata.uris, ReconstructorHint::Str)
                ));
            }
            if !expected.attributes.check(metadata.attributes.as_slice()) {
                errors.push(format!(
                    "{} Bad attributes. Want: {}. Have: \"{}\"",
                    prefix,
                    expected.attributes.original_json(),
                    self.reconstructor
                        .reconstruct(&metadata.attributes, ReconstructorHint::Str)
                ));
            }
        }
    }
}

/// Expectation for a token the account holds but the step does not list
fn unlisted_token(token_name: &[u8]) -> CheckEsdtData {
    CheckEsdtData {
        token_identifier: Parsed::new(
            token_name.to_vec(),
            serde_json::Value::String(String::from_utf8_lossy(token_name).into_owned()),
        ),
        instances: Vec::new(),
        last_nonce: Check::Unspecified,
        roles: Vec::new(),
        frozen: Check::Unspecified,
    }
}

/// Last nonce, roles and frozen flag of a token
fn check_token_properties(
    address: &str,
    token: &str,
    expected: &CheckEsdtData,
    account_token: &FullEsdtData,
    errors: &mut Vec<String>,
) {
    if !expected.last_nonce.check(&account_token.last_nonce) {
        errors.push(format!(
            "bad account ESDT last nonce. Account: {}. Token: {}. Want: \"{}\". Have: {}",
            address,
            token,
            expected.last_nonce.original_str(),
            account_token.last_nonce
        ));
    }

    let expected_roles: BTreeSet<&[u8]> = expected.roles.iter().map(|role| role.as_bytes()).collect();
    let account_roles: BTreeSet<&[u8]> = account_token
        .roles
        .iter()
        .map(|role| role.as_slice())
        .collect();
    for role in account_roles.difference(&expected_roles) {
        errors.push(format!(
            "unexpected ESDT role. Account: {}. Token: {}. Role: {}",
            address,
            token,
            String::from_utf8_lossy(role)
        ));
    }
    for role in expected_roles.difference(&account_roles) {
        errors.push(format!(
            "missing ESDT role. Account: {}. Token: {}. Role: {}",
            address,
            token,
            String::from_utf8_lossy(role)
        ));
    }

    let frozen = u64::from(account_token.frozen);
    if !expected.frozen.check(&frozen) {
        errors.push(format!(
            "bad ESDT frozen flag. Account: {}. Token: {}. Want: \"{}\". Have: {}",
            address,
            token,
            expected.frozen.original_str(),
            frozen
        ));
    }
}
