//! Webhook event dispatch.
//!
//! One delivery turns into a short sequence of outbound calls: fetch the Up
//! transaction, then create, update or delete its Firefly counterpart. The
//! Firefly transaction is found again through the tag carrying the Up
//! transaction id.

use std::sync::Arc;
use thiserror::Error;

use super::translator::{self, Translation, TranslationError};
use super::{BankApi, ClientError, LedgerApi};
use crate::models::firefly::SplitUpdate;
use crate::models::up::{EventType, TransactionLink, WebhookEventResource};
use crate::models::SyncSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Created,
    Settled,
    Deleted,
    Skipped(&'static str),
    /// The tagged Firefly transaction was not found; nothing was changed.
    NotFound,
    Ignored,
}

impl EventOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Settled => "settled",
            Self::Deleted => "deleted",
            Self::Skipped(_) => "skipped",
            Self::NotFound => "not_found",
            Self::Ignored => "ignored",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Event carries no transaction relationship")]
    MissingTransaction,

    #[error("Up API error: {0}")]
    Bank(#[source] ClientError),

    #[error("Firefly API error: {0}")]
    Ledger(#[source] ClientError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

#[derive(Clone)]
pub struct EventProcessor {
    bank: Arc<dyn BankApi>,
    ledger: Arc<dyn LedgerApi>,
    snapshot: Arc<SyncSnapshot>,
}

impl EventProcessor {
    pub fn new(
        bank: Arc<dyn BankApi>,
        ledger: Arc<dyn LedgerApi>,
        snapshot: Arc<SyncSnapshot>,
    ) -> Self {
        Self {
            bank,
            ledger,
            snapshot,
        }
    }

    pub async fn handle(&self, event: &WebhookEventResource) -> Result<EventOutcome, ProcessError> {
        let event_type = event.attributes.event_type;
        let link = event.relationships.transaction.as_ref();

        match event_type {
            EventType::TransactionCreated => self.on_created(Self::require(link)?).await,
            EventType::TransactionSettled => self.on_settled(Self::require(link)?).await,
            EventType::TransactionDeleted => self.on_deleted(Self::require(link)?).await,
            EventType::Ping | EventType::Unknown => {
                tracing::debug!(event_type = %event_type, "Ignoring webhook event");
                Ok(EventOutcome::Ignored)
            }
        }
    }

    fn require(link: Option<&TransactionLink>) -> Result<&TransactionLink, ProcessError> {
        link.ok_or(ProcessError::MissingTransaction)
    }

    async fn transaction_id(&self, link: &TransactionLink) -> Result<String, ProcessError> {
        if let Some(id) = link.transaction_id() {
            return Ok(id.to_string());
        }
        let url = link.related_url().ok_or(ProcessError::MissingTransaction)?;
        let txn = self
            .bank
            .fetch_transaction(url)
            .await
            .map_err(ProcessError::Bank)?;
        Ok(txn.id)
    }

    async fn on_created(&self, link: &TransactionLink) -> Result<EventOutcome, ProcessError> {
        let url = link.related_url().ok_or(ProcessError::MissingTransaction)?;
        let txn = self
            .bank
            .fetch_transaction(url)
            .await
            .map_err(ProcessError::Bank)?;

        match translator::translate(&txn, &self.snapshot)? {
            Translation::Skip(reason) => {
                tracing::info!(transaction_id = %txn.id, reason, "Not recording transaction");
                Ok(EventOutcome::Skipped(reason))
            }
            Translation::Create(ledger_txn) => {
                self.ledger
                    .create_transaction(&ledger_txn)
                    .await
                    .map_err(ProcessError::Ledger)?;

                tracing::info!(
                    transaction_id = %txn.id,
                    kind = ?ledger_txn.kind,
                    amount = %ledger_txn.amount,
                    "Transaction recorded in Firefly"
                );
                Ok(EventOutcome::Created)
            }
        }
    }

    async fn on_settled(&self, link: &TransactionLink) -> Result<EventOutcome, ProcessError> {
        let transaction_id = self.transaction_id(link).await?;

        let Some(group) = self.find_tagged(&transaction_id).await? else {
            return Ok(EventOutcome::NotFound);
        };

        let split = group.first_split();
        let update = SplitUpdate {
            description: translator::strip_held_marker(
                split.map(|s| s.description.as_str()).unwrap_or_default(),
            )
            .to_string(),
            source_name: split.and_then(|s| s.source_name.clone()),
        };

        self.ledger
            .update_transaction(&group.id, &update)
            .await
            .map_err(ProcessError::Ledger)?;

        tracing::info!(
            transaction_id = %transaction_id,
            firefly_id = %group.id,
            "Transaction settled in Firefly"
        );
        Ok(EventOutcome::Settled)
    }

    async fn on_deleted(&self, link: &TransactionLink) -> Result<EventOutcome, ProcessError> {
        let transaction_id = self.transaction_id(link).await?;

        let Some(group) = self.find_tagged(&transaction_id).await? else {
            return Ok(EventOutcome::NotFound);
        };

        self.ledger
            .delete_transaction(&group.id)
            .await
            .map_err(ProcessError::Ledger)?;

        tracing::info!(
            transaction_id = %transaction_id,
            firefly_id = %group.id,
            "Transaction deleted from Firefly"
        );
        Ok(EventOutcome::Deleted)
    }

    async fn find_tagged(
        &self,
        transaction_id: &str,
    ) -> Result<Option<crate::models::firefly::TransactionGroup>, ProcessError> {
        let group = self
            .ledger
            .find_transaction_by_tag(transaction_id)
            .await
            .map_err(ProcessError::Ledger)?;

        // Suppressed outgoing transfers are never recorded, so a miss is
        // expected for them; the handler counts it as a `not_found` outcome.
        if group.is_none() {
            tracing::info!(
                transaction_id = %transaction_id,
                "No Firefly transaction tagged with Up transaction id"
            );
        }

        Ok(group)
    }
}
