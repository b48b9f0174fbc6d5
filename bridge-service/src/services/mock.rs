//! In-memory API doubles for unit tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::{BankApi, ClientError, LedgerApi};
use crate::models::firefly::{
    AccountRead, AccountReadAttributes, AccountStore, CategoryRead, CategoryReadAttributes,
    LedgerTransaction, SplitUpdate, TransactionGroup, TransactionGroupAttributes,
    TransactionSplit,
};
use crate::models::up::{
    AccountResource, CategoryResource, TransactionResource, WebhookResource,
};

fn status_error(status: StatusCode) -> ClientError {
    ClientError::Status {
        status,
        body: String::new(),
    }
}

#[derive(Default)]
pub struct MockBank {
    pub ping_status: Mutex<Option<StatusCode>>,
    accounts: Mutex<Vec<AccountResource>>,
    categories: Mutex<Vec<CategoryResource>>,
    webhooks: Mutex<Vec<WebhookResource>>,
    registered: Mutex<Vec<String>>,
    transactions: Mutex<Vec<TransactionResource>>,
    fetch_count: AtomicU64,
}

impl MockBank {
    pub fn add_account(&self, account: serde_json::Value) {
        self.accounts
            .lock()
            .unwrap()
            .push(serde_json::from_value(account).unwrap());
    }

    pub fn add_category(&self, id: &str, name: &str) {
        self.categories.lock().unwrap().push(
            serde_json::from_value(serde_json::json!({ "id": id, "attributes": { "name": name } }))
                .unwrap(),
        );
    }

    pub fn add_webhook(&self, url: &str) {
        self.webhooks.lock().unwrap().push(
            serde_json::from_value(serde_json::json!({
                "id": format!("wh-{}", url.len()),
                "attributes": { "url": url, "description": null }
            }))
            .unwrap(),
        );
    }

    pub fn add_transaction(&self, transaction: serde_json::Value) {
        self.transactions
            .lock()
            .unwrap()
            .push(serde_json::from_value(transaction).unwrap());
    }

    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BankApi for MockBank {
    async fn ping(&self) -> Result<(), ClientError> {
        match *self.ping_status.lock().unwrap() {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }

    async fn list_webhooks(&self) -> Result<Vec<WebhookResource>, ClientError> {
        Ok(self.webhooks.lock().unwrap().clone())
    }

    async fn register_webhook(&self, url: &str, _description: &str) -> Result<(), ClientError> {
        self.registered.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<AccountResource>, ClientError> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryResource>, ClientError> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn fetch_transaction(&self, url: &str) -> Result<TransactionResource, ClientError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|t| url.ends_with(&format!("/{}", t.id)))
            .cloned()
            .ok_or_else(|| status_error(StatusCode::NOT_FOUND))
    }
}

#[derive(Default)]
pub struct MockLedger {
    pub about_status: Mutex<Option<StatusCode>>,
    pub reject_account_creation: Mutex<bool>,
    accounts: Mutex<Vec<AccountRead>>,
    created_accounts: Mutex<Vec<AccountStore>>,
    renames: Mutex<Vec<(String, String)>>,
    categories: Mutex<Vec<String>>,
    created_categories: Mutex<Vec<String>>,
    groups: Mutex<Vec<(String, TransactionGroup)>>,
    created: Mutex<Vec<LedgerTransaction>>,
    updates: Mutex<Vec<(String, SplitUpdate)>>,
    deleted: Mutex<Vec<String>>,
}

impl MockLedger {
    pub fn add_account(&self, id: &str, number: &str, name: &str) {
        self.accounts.lock().unwrap().push(AccountRead {
            id: id.to_string(),
            attributes: AccountReadAttributes {
                name: name.to_string(),
                account_number: Some(number.to_string()),
            },
        });
    }

    pub fn add_category(&self, name: &str) {
        self.categories.lock().unwrap().push(name.to_string());
    }

    pub fn add_group(&self, id: &str, tag: &str, description: &str, source_name: Option<&str>) {
        self.groups.lock().unwrap().push((
            tag.to_string(),
            TransactionGroup {
                id: id.to_string(),
                attributes: TransactionGroupAttributes {
                    transactions: vec![TransactionSplit {
                        description: description.to_string(),
                        source_name: source_name.map(str::to_string),
                    }],
                },
            },
        ));
    }

    pub fn find_group(&self, tag: &str) -> Option<TransactionGroup> {
        self.groups
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, g)| g.clone())
    }

    pub fn created_accounts(&self) -> Vec<AccountStore> {
        self.created_accounts.lock().unwrap().clone()
    }

    pub fn renames(&self) -> Vec<(String, String)> {
        self.renames.lock().unwrap().clone()
    }

    pub fn created_categories(&self) -> Vec<String> {
        self.created_categories.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<LedgerTransaction> {
        self.created.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, SplitUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerApi for MockLedger {
    async fn about(&self) -> Result<(), ClientError> {
        match *self.about_status.lock().unwrap() {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }

    async fn find_account_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<AccountRead>, ClientError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.attributes.account_number.as_deref() == Some(account_number))
            .cloned())
    }

    async fn create_account(&self, account: &AccountStore) -> Result<(), ClientError> {
        if *self.reject_account_creation.lock().unwrap() {
            return Err(status_error(StatusCode::UNPROCESSABLE_ENTITY));
        }
        self.created_accounts.lock().unwrap().push(account.clone());
        Ok(())
    }

    async fn rename_account(&self, account_id: &str, name: &str) -> Result<(), ClientError> {
        self.renames
            .lock()
            .unwrap()
            .push((account_id.to_string(), name.to_string()));
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRead>, ClientError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, name)| CategoryRead {
                id: i.to_string(),
                attributes: CategoryReadAttributes { name: name.clone() },
            })
            .collect())
    }

    async fn create_category(&self, name: &str) -> Result<(), ClientError> {
        self.created_categories.lock().unwrap().push(name.to_string());
        self.categories.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn find_transaction_by_tag(
        &self,
        tag: &str,
    ) -> Result<Option<TransactionGroup>, ClientError> {
        Ok(self.find_group(tag))
    }

    async fn create_transaction(
        &self,
        transaction: &LedgerTransaction,
    ) -> Result<(), ClientError> {
        self.created.lock().unwrap().push(transaction.clone());
        Ok(())
    }

    async fn update_transaction(
        &self,
        group_id: &str,
        update: &SplitUpdate,
    ) -> Result<(), ClientError> {
        self.updates
            .lock()
            .unwrap()
            .push((group_id.to_string(), update.clone()));
        Ok(())
    }

    async fn delete_transaction(&self, group_id: &str) -> Result<(), ClientError> {
        self.groups.lock().unwrap().retain(|(_, g)| g.id != group_id);
        self.deleted.lock().unwrap().push(group_id.to_string());
        Ok(())
    }
}
