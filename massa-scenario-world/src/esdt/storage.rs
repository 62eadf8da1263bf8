// Copyright (c) 2022 MASSA LABS <info@massa.net>

//! Where ESDT data lives in account storage.
//!
//! * `ELRONDesdt<token>[<nonce>]`: token instance
//! * `ELRONDnonce<token>`: last created nonce
//! * `ELRONDroleesdt<token>`: roles of the account for the token

use std::collections::BTreeMap;

use num::BigUint;

use crate::account::Account;
use crate::error::WorldError;

use super::codec::{
    decode_all, EsdtRolesDeserializer, EsdtRolesSerializer, EsdtToken, EsdtTokenDeserializer,
    EsdtTokenSerializer, Serializer,
};

pub const ESDT_KEY_PREFIX: &[u8] = b"ELRONDesdt";
pub const ESDT_ROLE_KEY_PREFIX: &[u8] = b"ELRONDroleesdt";
pub const ESDT_NONCE_KEY_PREFIX: &[u8] = b"ELRONDnonce";

/// Length of the random suffix of a token identifier, after the dash
const TOKEN_RANDOM_SUFFIX_LENGTH: usize = 6;

/// Minimal big-endian encoding, empty for zero
pub fn nonce_to_bytes(nonce: u64) -> Vec<u8> {
    let bytes = nonce.to_be_bytes();
    let first = bytes.iter().position(|byte| *byte != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

/// Big-endian bytes to u64, keeping the low 8 bytes
pub fn bytes_to_nonce(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .rev()
        .take(8)
        .rev()
        .fold(0u64, |acc, byte| (acc << 8) | *byte as u64)
}

pub fn esdt_token_key(token_identifier: &[u8], nonce: u64) -> Vec<u8> {
    let mut key = [ESDT_KEY_PREFIX, token_identifier].concat();
    key.extend(nonce_to_bytes(nonce));
    key
}

pub fn esdt_roles_key(token_identifier: &[u8]) -> Vec<u8> {
    [ESDT_ROLE_KEY_PREFIX, token_identifier].concat()
}

pub fn esdt_last_nonce_key(token_identifier: &[u8]) -> Vec<u8> {
    [ESDT_NONCE_KEY_PREFIX, token_identifier].concat()
}

/// Splits `TICKER-abcdef<nonce bytes>` into identifier and nonce
pub fn split_token_key(token_and_nonce: &[u8]) -> (Vec<u8>, u64) {
    match token_and_nonce.iter().position(|byte| *byte == b'-') {
        Some(dash) if token_and_nonce.len() >= dash + 1 + TOKEN_RANDOM_SUFFIX_LENGTH => {
            let split = dash + 1 + TOKEN_RANDOM_SUFFIX_LENGTH;
            (
                token_and_nonce[..split].to_vec(),
                bytes_to_nonce(&token_and_nonce[split..]),
            )
        }
        _ => (token_and_nonce.to_vec(), 0),
    }
}

/// Everything an account holds of one token
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FullEsdtData {
    pub token_identifier: Vec<u8>,
    /// instances by nonce
    pub instances: BTreeMap<u64, EsdtToken>,
    pub last_nonce: u64,
    pub roles: Vec<Vec<u8>>,
    pub frozen: bool,
}

impl Account {
    /// Token instance stored on this account
    pub fn esdt_token(
        &self,
        token_identifier: &[u8],
        nonce: u64,
    ) -> Result<Option<EsdtToken>, WorldError> {
        match self.storage.get(&esdt_token_key(token_identifier, nonce)) {
            None => Ok(None),
            Some(bytes) if bytes.is_empty() => Ok(None),
            Some(bytes) => decode_all(&EsdtTokenDeserializer::new(), bytes).map(Some),
        }
    }

    /// Balance of one token instance, zero if absent
    pub fn esdt_balance(&self, token_identifier: &[u8], nonce: u64) -> Result<BigUint, WorldError> {
        Ok(self
            .esdt_token(token_identifier, nonce)?
            .map(|token| token.value)
            .unwrap_or_default())
    }

    /// Stores a token instance
    pub fn set_esdt_token(
        &mut self,
        token_identifier: &[u8],
        nonce: u64,
        token: &EsdtToken,
    ) -> Result<(), WorldError> {
        let mut buffer = Vec::new();
        EsdtTokenSerializer::new().serialize(token, &mut buffer)?;
        self.storage
            .insert(esdt_token_key(token_identifier, nonce), buffer);
        Ok(())
    }

    /// Stores a token instance, or removes it once its balance reaches zero
    pub fn save_esdt_token(
        &mut self,
        token_identifier: &[u8],
        nonce: u64,
        token: &EsdtToken,
    ) -> Result<(), WorldError> {
        if token.value.bits() == 0 {
            self.storage.remove(&esdt_token_key(token_identifier, nonce));
            return Ok(());
        }
        self.set_esdt_token(token_identifier, nonce, token)
    }

    pub fn esdt_last_nonce(&self, token_identifier: &[u8]) -> u64 {
        self.storage
            .get(&esdt_last_nonce_key(token_identifier))
            .map_or(0, |bytes| bytes_to_nonce(bytes))
    }

    pub fn set_esdt_last_nonce(&mut self, token_identifier: &[u8], nonce: u64) {
        self.save_key_value(esdt_last_nonce_key(token_identifier), nonce_to_bytes(nonce));
    }

    pub fn esdt_roles(&self, token_identifier: &[u8]) -> Result<Vec<Vec<u8>>, WorldError> {
        match self.storage.get(&esdt_roles_key(token_identifier)) {
            None => Ok(Vec::new()),
            Some(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Some(bytes) => decode_all(&EsdtRolesDeserializer::new(), bytes),
        }
    }

    pub fn set_esdt_roles(
        &mut self,
        token_identifier: &[u8],
        roles: &[Vec<u8>],
    ) -> Result<(), WorldError> {
        let key = esdt_roles_key(token_identifier);
        if roles.is_empty() {
            self.storage.remove(&key);
            return Ok(());
        }
        let mut buffer = Vec::new();
        EsdtRolesSerializer::new().serialize(roles, &mut buffer)?;
        self.storage.insert(key, buffer);
        Ok(())
    }

    /// Whether the account holds `role` for the token
    pub fn has_esdt_role(&self, token_identifier: &[u8], role: &[u8]) -> Result<bool, WorldError> {
        Ok(self
            .esdt_roles(token_identifier)?
            .iter()
            .any(|held| held == role))
    }

    /// All tokens found in the account storage, by identifier
    pub fn full_esdt_data(&self) -> Result<BTreeMap<Vec<u8>, FullEsdtData>, WorldError> {
        let mut tokens: BTreeMap<Vec<u8>, FullEsdtData> = BTreeMap::new();
        fn entry<'a>(
            tokens: &'a mut BTreeMap<Vec<u8>, FullEsdtData>,
            token_identifier: &[u8],
        ) -> &'a mut FullEsdtData {
            tokens
                .entry(token_identifier.to_vec())
                .or_insert_with(|| FullEsdtData {
                    token_identifier: token_identifier.to_vec(),
                    ..Default::default()
                })
        }
        for (key, value) in &self.storage {
            if value.is_empty() {
                continue;
            }
            if let Some(rest) = key.strip_prefix(ESDT_KEY_PREFIX) {
                let (token_identifier, nonce) = split_token_key(rest);
                let token = decode_all(&EsdtTokenDeserializer::new(), value)?;
                let data = entry(&mut tokens, &token_identifier);
                data.frozen |= token.is_frozen();
                data.instances.insert(nonce, token);
            } else if let Some(token_identifier) = key.strip_prefix(ESDT_ROLE_KEY_PREFIX) {
                entry(&mut tokens, token_identifier).roles =
                    decode_all(&EsdtRolesDeserializer::new(), value)?;
            } else if let Some(token_identifier) = key.strip_prefix(ESDT_NONCE_KEY_PREFIX) {
                entry(&mut tokens, token_identifier).last_nonce = bytes_to_nonce(value);
            }
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_bytes() {
        assert!(nonce_to_bytes(0).is_empty());
        assert_eq!(nonce_to_bytes(1), vec![1]);
        assert_eq!(nonce_to_bytes(0x0102), vec![1, 2]);
        assert_eq!(bytes_to_nonce(&[1, 2]), 0x0102);
        assert_eq!(bytes_to_nonce(&[]), 0);
    }

    #[test]
    fn test_split_token_key() {
        assert_eq!(split_token_key(b"NFT-123456\x05"), (b"NFT-123456".to_vec(), 5));
        assert_eq!(split_token_key(b"TOK-123456"), (b"TOK-123456".to_vec(), 0));
        assert_eq!(split_token_key(b"LEGACY"), (b"LEGACY".to_vec(), 0));
    }

    #[test]
    fn test_full_esdt_data_collects_every_key() {
        let mut account = Account::new(vec![1; 32]);
        account
            .set_esdt_token(b"TOK-123456", 0, &EsdtToken::fungible(BigUint::from(150u32)))
            .unwrap();
        account
            .set_esdt_token(b"NFT-abcdef", 2, &EsdtToken::fungible(BigUint::from(1u32)))
            .unwrap();
        account.set_esdt_last_nonce(b"NFT-abcdef", 2);
        account
            .set_esdt_roles(b"NFT-abcdef", &[b"ESDTRoleNFTCreate".to_vec()])
            .unwrap();
        account.save_key_value(b"other".to_vec(), b"value".to_vec());

        let tokens = account.full_esdt_data().unwrap();
        assert_eq!(tokens.len(), 2);
        let fungible = &tokens[b"TOK-123456".as_slice()];
        assert_eq!(fungible.instances[&0].value, BigUint::from(150u32));
        let nft = &tokens[b"NFT-abcdef".as_slice()];
        assert_eq!(nft.last_nonce, 2);
        assert_eq!(nft.roles, vec![b"ESDTRoleNFTCreate".to_vec()]);
        assert!(nft.instances.contains_key(&2));
    }

    #[test]
    fn test_zero_balance_removes_instance() {
        let mut account = Account::new(vec![1; 32]);
        account
            .save_esdt_token(b"TOK-123456", 0, &EsdtToken::fungible(BigUint::from(3u32)))
            .unwrap();
        assert_eq!(account.storage.len(), 1);
        account
            .save_esdt_token(b"TOK-123456", 0, &EsdtToken::fungible(BigUint::default()))
            .unwrap();
        assert!(account.storage.is_empty());
    }
}
