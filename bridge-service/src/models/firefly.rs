//! Firefly III API request and response bodies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub links: ListLinks,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListLinks {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AccountRole {
    DefaultAsset,
    SavingAsset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountRead {
    pub id: String,
    pub attributes: AccountReadAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountReadAttributes {
    pub name: String,
    pub account_number: Option<String>,
}

/// Body for `POST /accounts`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccountStore {
    pub account_number: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub account_role: AccountRole,
    pub opening_balance: String,
    pub opening_balance_date: String,
    pub currency_code: String,
}

/// Body for `PUT /accounts/{id}`.
#[derive(Debug, Serialize)]
pub struct AccountUpdate<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRead {
    pub id: String,
    pub attributes: CategoryReadAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryReadAttributes {
    pub name: String,
}

/// Body for `POST /categories`.
#[derive(Debug, Serialize)]
pub struct CategoryStore<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

/// One split of a transaction to be stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LedgerTransaction {
    pub amount: String,
    pub description: String,
    pub source_name: String,
    pub destination_name: String,
    pub category_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub tags: Vec<String>,
    pub date: String,
}

/// Body for `POST /transactions`.
#[derive(Debug, Serialize)]
pub struct TransactionStore<'a> {
    pub transactions: [&'a LedgerTransaction; 1],
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SplitUpdate {
    pub description: String,
    pub source_name: Option<String>,
}

/// Body for `PUT /transactions/{id}`.
#[derive(Debug, Serialize)]
pub struct TransactionUpdate<'a> {
    pub transactions: [&'a SplitUpdate; 1],
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionGroup {
    pub id: String,
    pub attributes: TransactionGroupAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionGroupAttributes {
    #[serde(default)]
    pub transactions: Vec<TransactionSplit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionSplit {
    #[serde(default)]
    pub description: String,
    pub source_name: Option<String>,
}

impl TransactionGroup {
    pub fn first_split(&self) -> Option<&TransactionSplit> {
        self.attributes.transactions.first()
    }
}
