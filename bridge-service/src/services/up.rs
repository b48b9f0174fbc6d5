//! Up bank API client.
//!
//! All calls are bearer-authenticated. Collection endpoints are paginated by
//! Up; the client follows `links.next` until the last page.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use service_core::observability::{TracedClientExt, TracedRequest};

use super::{check_status, decode, BankApi, ClientError};
use crate::config::UpConfig;
use crate::models::up::{
    AccountResource, CategoryResource, CreateWebhook, Document, Page, TransactionResource,
    WebhookResource,
};

#[derive(Clone)]
pub struct UpClient {
    client: Client,
    config: UpConfig,
}

impl UpClient {
    pub fn new(config: UpConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: TracedRequest) -> TracedRequest {
        request
            .header("accept", "application/json")
            .bearer_auth(self.config.token.expose_secret())
    }

    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ClientError> {
        let mut items = Vec::new();
        let mut next = Some(self.url(path));

        while let Some(url) = next {
            let response = self
                .authorized(self.client.traced_get(&url))
                .send()
                .await
                .map_err(ClientError::Connection)?;
            let page: Page<T> = decode(check_status(response).await?).await?;

            items.extend(page.data);
            next = page.links.next;
        }

        Ok(items)
    }
}

#[async_trait]
impl BankApi for UpClient {
    async fn ping(&self) -> Result<(), ClientError> {
        let response = self
            .authorized(self.client.traced_get(&self.url("util/ping")))
            .send()
            .await
            .map_err(ClientError::Connection)?;

        // Anything short of a plain 200 means the token was not accepted.
        if response.status() != reqwest::StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(())
    }

    async fn list_webhooks(&self) -> Result<Vec<WebhookResource>, ClientError> {
        self.get_all("webhooks").await
    }

    async fn register_webhook(&self, url: &str, description: &str) -> Result<(), ClientError> {
        let response = self
            .authorized(self.client.traced_post(&self.url("webhooks")))
            .json(&CreateWebhook::new(url, description))
            .send()
            .await
            .map_err(ClientError::Connection)?;

        check_status(response).await?;
        tracing::info!(url = %url, "Registered Up webhook");
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<AccountResource>, ClientError> {
        self.get_all("accounts").await
    }

    async fn list_categories(&self) -> Result<Vec<CategoryResource>, ClientError> {
        self.get_all("categories").await
    }

    async fn fetch_transaction(&self, url: &str) -> Result<TransactionResource, ClientError> {
        let response = self
            .authorized(self.client.traced_get(url))
            .send()
            .await
            .map_err(ClientError::Connection)?;

        let document: Document<TransactionResource> = decode(check_status(response).await?).await?;
        Ok(document.data)
    }
}
