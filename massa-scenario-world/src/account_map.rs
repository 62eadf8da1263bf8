// Copyright (c) 2022 MASSA LABS <info@massa.net>

use std::collections::BTreeMap;

use crate::account::Account;

/// Accounts ordered by raw address bytes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountMap(BTreeMap<Vec<u8>, Account>);

impl AccountMap {
    pub fn new() -> Self {
        AccountMap(BTreeMap::new())
    }

    /// Inserts or replaces the account stored under its own address
    pub fn put_account(&mut self, account: Account) {
        self.0.insert(account.address.clone(), account);
    }

    pub fn get_account(&self, address: &[u8]) -> Option<&Account> {
        self.0.get(address)
    }

    pub fn get_account_mut(&mut self, address: &[u8]) -> Option<&mut Account> {
        self.0.get_mut(address)
    }

    /// Existing account, or a fresh empty one
    pub fn get_or_create_account(&mut self, address: &[u8]) -> &mut Account {
        self.0
            .entry(address.to_vec())
            .or_insert_with(|| Account::new(address.to_vec()))
    }

    pub fn delete_account(&mut self, address: &[u8]) -> Option<Account> {
        self.0.remove(address)
    }

    pub fn contains(&self, address: &[u8]) -> bool {
        self.0.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &Account)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Vec<u8>, &mut Account)> {
        self.0.iter_mut()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Vec<u8>> {
        self.0.keys()
    }
}
