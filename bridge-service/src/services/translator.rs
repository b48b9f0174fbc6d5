//! Up transaction → Firefly transaction translation.
//!
//! Plain transactions become deposits or withdrawals by the sign of their
//! amount. Transactions between two Up accounts are classified by
//! [`TRANSFER_RULES`]; only the receiving side of a transfer is recorded so
//! each movement lands in the ledger once.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::firefly::{LedgerTransaction, TransactionKind};
use crate::models::up::{TransactionResource, TransactionStatus};
use crate::models::SyncSnapshot;

pub const HELD_MARKER: &str = "[HELD] ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionMatch {
    Prefix(&'static str),
    Exact(&'static str),
}

impl DescriptionMatch {
    fn matches(&self, description: &str) -> bool {
        match self {
            Self::Prefix(prefix) => description.starts_with(prefix),
            Self::Exact(exact) => description == *exact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAction {
    /// Outgoing side; the counterpart account's event records it.
    Suppress,
    /// Record the transfer under this label.
    Label(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct TransferRule {
    pub pattern: DescriptionMatch,
    pub action: TransferAction,
}

/// Evaluated top to bottom; the first matching rule wins.
pub const TRANSFER_RULES: &[TransferRule] = &[
    TransferRule {
        pattern: DescriptionMatch::Prefix("Quick save transfer to"),
        action: TransferAction::Suppress,
    },
    TransferRule {
        pattern: DescriptionMatch::Prefix("Transfer to"),
        action: TransferAction::Suppress,
    },
    TransferRule {
        pattern: DescriptionMatch::Prefix("Quick save transfer from"),
        action: TransferAction::Label("Quick Save"),
    },
    TransferRule {
        pattern: DescriptionMatch::Prefix("Transfer from"),
        action: TransferAction::Label("Transfer"),
    },
    TransferRule {
        pattern: DescriptionMatch::Exact("Round Up"),
        action: TransferAction::Label("Round Up"),
    },
];

pub fn classify_transfer(description: &str) -> Option<TransferAction> {
    TRANSFER_RULES
        .iter()
        .find(|rule| rule.pattern.matches(description))
        .map(|rule| rule.action)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    Create(LedgerTransaction),
    /// Nothing to record; carries the reason for logging.
    Skip(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum TranslationError {
    #[error("Account {0} was not imported at startup")]
    UnknownAccount(String),

    #[error("Invalid amount {value:?}: {reason}")]
    InvalidAmount { value: String, reason: String },
}

pub fn translate(
    txn: &TransactionResource,
    snapshot: &SyncSnapshot,
) -> Result<Translation, TranslationError> {
    let attrs = &txn.attributes;

    let account_id = txn.relationships.account.id().unwrap_or_default();
    let owning_account = snapshot
        .account_name(account_id)
        .ok_or_else(|| TranslationError::UnknownAccount(account_id.to_string()))?;

    let amount: Decimal = attrs
        .amount
        .value
        .parse()
        .map_err(|e: rust_decimal::Error| TranslationError::InvalidAmount {
            value: attrs.amount.value.clone(),
            reason: e.to_string(),
        })?;

    let mut label = attrs.raw_text.clone().unwrap_or_default();
    let mut tags = vec![txn.id.clone()];

    let (kind, source, destination) = match txn.relationships.transfer_account.id() {
        None => {
            if amount.is_zero() {
                return Ok(Translation::Skip("zero amount"));
            }
            if amount.is_sign_positive() {
                (
                    TransactionKind::Deposit,
                    attrs.description.clone(),
                    owning_account.to_string(),
                )
            } else {
                (
                    TransactionKind::Withdrawal,
                    owning_account.to_string(),
                    attrs.description.clone(),
                )
            }
        }
        Some(transfer_account_id) => {
            match classify_transfer(&attrs.description) {
                Some(TransferAction::Suppress) => {
                    return Ok(Translation::Skip("outgoing transfer"));
                }
                Some(TransferAction::Label(rule_label)) => label = rule_label.to_string(),
                None => {}
            }

            let other_account = snapshot
                .account_name(transfer_account_id)
                .ok_or_else(|| TranslationError::UnknownAccount(transfer_account_id.to_string()))?;

            if !label.is_empty() {
                tags.push(label.clone());
            }

            (
                TransactionKind::Transfer,
                other_account.to_string(),
                owning_account.to_string(),
            )
        }
    };

    let category_name = txn
        .relationships
        .category
        .id()
        .and_then(|category_id| match snapshot.category_name(category_id) {
            Some(name) => Some(name.to_string()),
            None => {
                tracing::warn!(category_id = %category_id, "Unknown Up category, leaving uncategorised");
                None
            }
        });

    let description = build_entry(
        attrs.status == TransactionStatus::Held,
        &label,
        attrs.message.as_deref().unwrap_or_default(),
        attrs
            .foreign_amount
            .as_ref()
            .map(|m| (m.value.as_str(), m.currency_code.as_str())),
    );

    Ok(Translation::Create(LedgerTransaction {
        amount: amount.abs().to_string(),
        description,
        source_name: source,
        destination_name: destination,
        category_name,
        kind,
        tags,
        date: attrs.created_at.clone(),
    }))
}

/// Ledger description, e.g. `"[HELD] My transaction (message) 40.00 USD"`.
///
/// The message is parenthesised only when it follows a label.
pub fn build_entry(
    held: bool,
    label: &str,
    message: &str,
    foreign_amount: Option<(&str, &str)>,
) -> String {
    let mut entry = String::new();
    if held {
        entry.push_str(HELD_MARKER);
    }
    entry.push_str(label);

    if !message.is_empty() {
        if !label.is_empty() {
            entry.push_str(&format!(" ({})", message));
        } else {
            entry.push_str(message);
        }
    }

    if let Some((value, currency_code)) = foreign_amount {
        entry.push_str(&format!(" {} {}", value, currency_code));
    }

    entry
}

/// Drop one leading held marker; anything else is returned unchanged.
pub fn strip_held_marker(description: &str) -> &str {
    description.strip_prefix(HELD_MARKER).unwrap_or(description)
}
