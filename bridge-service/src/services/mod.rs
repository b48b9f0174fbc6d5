pub mod bootstrap;
pub mod events;
pub mod firefly;
pub mod metrics;
pub mod translator;
pub mod up;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::models::firefly::{
    AccountRead, AccountStore, CategoryRead, LedgerTransaction, SplitUpdate, TransactionGroup,
};
use crate::models::up::{AccountResource, CategoryResource, TransactionResource, WebhookResource};

pub use bootstrap::SyncError;
pub use events::{EventOutcome, EventProcessor, ProcessError};
pub use firefly::FireflyClient;
pub use metrics::{get_metrics, init_metrics, record_best_effort_failure, record_event};
pub use translator::{Translation, TranslationError};
pub use up::UpClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The bank side: source of accounts, categories and transaction detail.
#[async_trait]
pub trait BankApi: Send + Sync {
    async fn ping(&self) -> Result<(), ClientError>;
    async fn list_webhooks(&self) -> Result<Vec<WebhookResource>, ClientError>;
    async fn register_webhook(&self, url: &str, description: &str) -> Result<(), ClientError>;
    async fn list_accounts(&self) -> Result<Vec<AccountResource>, ClientError>;
    async fn list_categories(&self) -> Result<Vec<CategoryResource>, ClientError>;
    async fn fetch_transaction(&self, url: &str) -> Result<TransactionResource, ClientError>;
}

/// The ledger side: receives mirrored accounts, categories and transactions.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn about(&self) -> Result<(), ClientError>;
    async fn find_account_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<AccountRead>, ClientError>;
    async fn create_account(&self, account: &AccountStore) -> Result<(), ClientError>;
    async fn rename_account(&self, account_id: &str, name: &str) -> Result<(), ClientError>;
    async fn list_categories(&self) -> Result<Vec<CategoryRead>, ClientError>;
    async fn create_category(&self, name: &str) -> Result<(), ClientError>;
    async fn find_transaction_by_tag(
        &self,
        tag: &str,
    ) -> Result<Option<TransactionGroup>, ClientError>;
    async fn create_transaction(&self, transaction: &LedgerTransaction)
        -> Result<(), ClientError>;
    async fn update_transaction(
        &self,
        group_id: &str,
        update: &SplitUpdate,
    ) -> Result<(), ClientError>;
    async fn delete_transaction(&self, group_id: &str) -> Result<(), ClientError>;
}

/// Turn a response into `Ok(response)` for 2xx, or a `ClientError::Status`
/// carrying the body text otherwise.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let body = response.text().await.map_err(ClientError::Connection)?;
    serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
pub(crate) mod mock;
