//! Boot-time synchronisation between Up and Firefly.
//!
//! Runs once before the webhook endpoint is served:
//! 1. both APIs must answer an authenticated request,
//! 2. the Up webhook pointing at this service must exist,
//! 3. every Up account is mirrored as a Firefly asset account,
//! 4. Up categories missing from Firefly are created.
//!
//! The resulting [`SyncSnapshot`] is what the webhook handler reads.

use chrono::NaiveDate;
use service_core::error::AppError;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::metrics::record_best_effort_failure;
use super::{BankApi, ClientError, LedgerApi};
use crate::models::firefly::{AccountRole, AccountStore};
use crate::models::up::AccountType;
use crate::models::{MirroredAccount, SyncSnapshot};
use crate::utils::clean_display_name;

pub const WEBHOOK_DESCRIPTION: &str = "Firefly";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Could not reach the Up API: {0}")]
    BankUnreachable(#[source] ClientError),

    #[error("Could not connect to the Up API. Please check your Up token and try again ({0})")]
    BankUnauthorized(#[source] ClientError),

    #[error("Unable to find your Firefly instance. Please check your Firefly URL and try again ({0})")]
    LedgerUnreachable(#[source] ClientError),

    #[error("Unable to connect to the Firefly API. Please check your Firefly token and try again ({0})")]
    LedgerUnauthorized(#[source] ClientError),

    #[error("Error creating Up account \"{name}\" in Firefly. Does a Firefly account already exist with the same name? ({source})")]
    AccountCollision {
        name: String,
        #[source]
        source: ClientError,
    },

    #[error("Up API error: {0}")]
    Bank(#[source] ClientError),

    #[error("Firefly API error: {0}")]
    Ledger(#[source] ClientError),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::BankUnauthorized(_) | SyncError::LedgerUnauthorized(_) => {
                AppError::ConfigError(anyhow::Error::new(err))
            }
            SyncError::BankUnreachable(_) | SyncError::LedgerUnreachable(_) => {
                AppError::ServiceUnavailable(err.to_string())
            }
            SyncError::AccountCollision { .. } => AppError::Conflict(anyhow::Error::new(err)),
            SyncError::Bank(_) | SyncError::Ledger(_) => AppError::BadGateway(err.to_string()),
        }
    }
}

/// Run the full boot sequence and return the lookup snapshot.
pub async fn run(
    bank: &dyn BankApi,
    ledger: &dyn LedgerApi,
    callback_url: &str,
    currency_code: &str,
    today: NaiveDate,
) -> Result<SyncSnapshot, SyncError> {
    check_connectivity(bank, ledger).await?;
    ensure_webhook(bank, callback_url).await?;
    let accounts = import_accounts(bank, ledger, currency_code, today).await?;
    let categories = import_categories(bank, ledger).await?;

    let snapshot = SyncSnapshot::new(accounts, categories);
    tracing::info!(
        accounts = snapshot.account_count(),
        categories = snapshot.category_count(),
        "Boot sync complete"
    );
    Ok(snapshot)
}

pub async fn check_connectivity(bank: &dyn BankApi, ledger: &dyn LedgerApi) -> Result<(), SyncError> {
    bank.ping().await.map_err(|e| match e {
        ClientError::Connection(_) => SyncError::BankUnreachable(e),
        _ => SyncError::BankUnauthorized(e),
    })?;
    tracing::info!("Connected to Up API");

    ledger.about().await.map_err(|e| match e {
        ClientError::Connection(_) => SyncError::LedgerUnreachable(e),
        _ => SyncError::LedgerUnauthorized(e),
    })?;
    tracing::info!("Connected to Firefly API");

    Ok(())
}

/// Register the callback with Up unless a webhook with exactly this URL exists.
pub async fn ensure_webhook(bank: &dyn BankApi, callback_url: &str) -> Result<(), SyncError> {
    let webhooks = bank.list_webhooks().await.map_err(SyncError::Bank)?;

    if webhooks.iter().any(|w| w.attributes.url == callback_url) {
        tracing::info!(url = %callback_url, "Found webhook");
        return Ok(());
    }

    tracing::info!(url = %callback_url, "Creating webhook");
    bank.register_webhook(callback_url, WEBHOOK_DESCRIPTION)
        .await
        .map_err(SyncError::Bank)
}

pub async fn import_accounts(
    bank: &dyn BankApi,
    ledger: &dyn LedgerApi,
    currency_code: &str,
    today: NaiveDate,
) -> Result<HashMap<String, MirroredAccount>, SyncError> {
    tracing::info!("Fetching Up accounts");
    let up_accounts = bank.list_accounts().await.map_err(SyncError::Bank)?;
    let mut accounts = HashMap::with_capacity(up_accounts.len());

    for up_account in up_accounts {
        let mirrored = MirroredAccount {
            name: clean_display_name(&up_account.attributes.display_name),
            role: match up_account.attributes.account_type {
                AccountType::Saver => AccountRole::SavingAsset,
                _ => AccountRole::DefaultAsset,
            },
            balance: up_account.attributes.balance.value.clone(),
        };

        let existing = ledger
            .find_account_by_number(&up_account.id)
            .await
            .map_err(SyncError::Ledger)?;

        match existing {
            None => {
                tracing::info!(account_id = %up_account.id, name = %mirrored.name, "Adding account to Firefly");
                let store = AccountStore {
                    account_number: up_account.id.clone(),
                    name: mirrored.name.clone(),
                    kind: "asset",
                    account_role: mirrored.role,
                    opening_balance: mirrored.balance.clone(),
                    opening_balance_date: today.format("%Y-%m-%d").to_string(),
                    currency_code: currency_code.to_string(),
                };
                ledger
                    .create_account(&store)
                    .await
                    .map_err(|source| SyncError::AccountCollision {
                        name: mirrored.name.clone(),
                        source,
                    })?;
            }
            Some(found) if found.attributes.name != mirrored.name => {
                tracing::info!(
                    account_id = %up_account.id,
                    from = %found.attributes.name,
                    to = %mirrored.name,
                    "Updating account name"
                );
                if let Err(e) = ledger.rename_account(&found.id, &mirrored.name).await {
                    tracing::warn!(account_id = %up_account.id, error = %e, "Account rename failed");
                    record_best_effort_failure("account_rename");
                }
            }
            Some(_) => {}
        }

        accounts.insert(up_account.id, mirrored);
    }

    Ok(accounts)
}

pub async fn import_categories(
    bank: &dyn BankApi,
    ledger: &dyn LedgerApi,
) -> Result<HashMap<String, String>, SyncError> {
    tracing::info!("Fetching transaction categories");

    let mut existing: HashSet<String> = ledger
        .list_categories()
        .await
        .map_err(SyncError::Ledger)?
        .into_iter()
        .map(|c| c.attributes.name)
        .collect();

    let up_categories = bank.list_categories().await.map_err(SyncError::Bank)?;
    let mut categories = HashMap::with_capacity(up_categories.len());

    for category in up_categories {
        let name = category.attributes.name;

        if !existing.contains(&name) {
            match ledger.create_category(&name).await {
                Ok(()) => {
                    tracing::info!(category = %name, "Created category");
                    existing.insert(name.clone());
                }
                Err(e) => {
                    tracing::warn!(category = %name, error = %e, "Category creation failed");
                    record_best_effort_failure("category_create");
                }
            }
        }

        categories.insert(category.id, name);
    }

    Ok(categories)
}
