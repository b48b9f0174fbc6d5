//! Lookup tables produced by the boot-time sync.
//!
//! A snapshot is built once and shared read-only (behind an `Arc`) by every
//! webhook request; nothing mutates it after construction.

use super::firefly::AccountRole;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MirroredAccount {
    pub name: String,
    pub role: AccountRole,
    pub balance: String,
}

#[derive(Debug, Clone, Default)]
pub struct SyncSnapshot {
    accounts: HashMap<String, MirroredAccount>,
    categories: HashMap<String, String>,
}

impl SyncSnapshot {
    pub fn new(
        accounts: HashMap<String, MirroredAccount>,
        categories: HashMap<String, String>,
    ) -> Self {
        Self {
            accounts,
            categories,
        }
    }

    pub fn account(&self, account_id: &str) -> Option<&MirroredAccount> {
        self.accounts.get(account_id)
    }

    pub fn account_name(&self, account_id: &str) -> Option<&str> {
        self.account(account_id).map(|a| a.name.as_str())
    }

    pub fn category_name(&self, category_id: &str) -> Option<&str> {
        self.categories.get(category_id).map(String::as_str)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}
