//! Up bank API resources (JSON:API shaped).
//!
//! Only the fields the bridge reads are modelled; everything else in the
//! payloads is ignored during deserialisation.

use serde::{Deserialize, Serialize};

/// Single-resource document: `{ "data": T }`.
#[derive(Debug, Deserialize)]
pub struct Document<T> {
    pub data: T,
}

/// Paginated collection document.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub links: PageLinks,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageLinks {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub currency_code: String,
    /// Decimal string, negative for money leaving the account.
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountResource {
    pub id: String,
    pub attributes: AccountAttributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAttributes {
    pub display_name: String,
    pub account_type: AccountType,
    pub balance: Money,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Saver,
    Transactional,
    HomeLoan,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryResource {
    pub id: String,
    pub attributes: CategoryAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryAttributes {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookResource {
    pub id: String,
    pub attributes: WebhookAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookAttributes {
    pub url: String,
    pub description: Option<String>,
}

/// Body for `POST /webhooks`.
#[derive(Debug, Serialize)]
pub struct CreateWebhook<'a> {
    pub data: CreateWebhookData<'a>,
}

#[derive(Debug, Serialize)]
pub struct CreateWebhookData<'a> {
    pub attributes: CreateWebhookAttributes<'a>,
}

#[derive(Debug, Serialize)]
pub struct CreateWebhookAttributes<'a> {
    pub url: &'a str,
    pub description: &'a str,
}

impl<'a> CreateWebhook<'a> {
    pub fn new(url: &'a str, description: &'a str) -> Self {
        Self {
            data: CreateWebhookData {
                attributes: CreateWebhookAttributes { url, description },
            },
        }
    }
}

/// Inbound webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub data: WebhookEventResource,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventResource {
    pub attributes: WebhookEventAttributes,
    #[serde(default)]
    pub relationships: WebhookEventRelationships,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEventAttributes {
    pub event_type: EventType,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    TransactionCreated,
    TransactionSettled,
    TransactionDeleted,
    Ping,
    #[serde(other)]
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionCreated => "TRANSACTION_CREATED",
            Self::TransactionSettled => "TRANSACTION_SETTLED",
            Self::TransactionDeleted => "TRANSACTION_DELETED",
            Self::Ping => "PING",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookEventRelationships {
    pub transaction: Option<TransactionLink>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionLink {
    #[serde(default)]
    pub data: Option<ResourceIdentifier>,
    #[serde(default)]
    pub links: Option<RelatedLink>,
}

impl TransactionLink {
    pub fn related_url(&self) -> Option<&str> {
        self.links.as_ref().map(|l| l.related.as_str())
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.id.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct RelatedLink {
    pub related: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResourceIdentifier {
    pub id: String,
}

/// A relationship whose target may be absent (`"data": null`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceIdentifier>,
}

impl Relationship {
    pub fn id(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResource {
    pub id: String,
    pub attributes: TransactionAttributes,
    pub relationships: TransactionRelationships,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Held,
    Settled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAttributes {
    pub status: TransactionStatus,
    pub raw_text: Option<String>,
    #[serde(default)]
    pub description: String,
    pub message: Option<String>,
    pub amount: Money,
    pub foreign_amount: Option<Money>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRelationships {
    pub account: Relationship,
    #[serde(default)]
    pub transfer_account: Relationship,
    #[serde(default)]
    pub category: Relationship,
}
