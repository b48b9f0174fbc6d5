//! Firefly III API client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use service_core::observability::{TracedClientExt, TracedRequest};

use super::{check_status, decode, ClientError, LedgerApi};
use crate::config::FireflyConfig;
use crate::models::firefly::{
    AccountRead, AccountStore, AccountUpdate, CategoryRead, CategoryStore, LedgerTransaction,
    ListResponse, SplitUpdate, TransactionGroup, TransactionStore, TransactionUpdate,
};

const API_PREFIX: &str = "api/v1";

#[derive(Clone)]
pub struct FireflyClient {
    client: Client,
    config: FireflyConfig,
}

impl FireflyClient {
    pub fn new(config: FireflyConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            API_PREFIX,
            path
        )
    }

    fn authorized(&self, request: TracedRequest) -> TracedRequest {
        // Firefly answers with an HTML login redirect unless JSON is requested.
        request
            .header("accept", "application/json")
            .bearer_auth(self.config.token.expose_secret())
    }

    async fn send(&self, request: TracedRequest) -> Result<reqwest::Response, ClientError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(ClientError::Connection)?;
        check_status(response).await
    }

    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ClientError> {
        let mut items = Vec::new();
        let mut next = Some(self.url(path));

        while let Some(url) = next {
            let response = self.send(self.client.traced_get(&url)).await?;
            let page: ListResponse<T> = decode(response).await?;

            items.extend(page.data);
            next = page.links.next;
        }

        Ok(items)
    }
}

#[async_trait]
impl LedgerApi for FireflyClient {
    async fn about(&self) -> Result<(), ClientError> {
        let response = self
            .authorized(self.client.traced_get(&self.url("about")))
            .send()
            .await
            .map_err(ClientError::Connection)?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(())
    }

    async fn find_account_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<AccountRead>, ClientError> {
        let response = self
            .send(
                self.client
                    .traced_get(&self.url("search/accounts"))
                    .query(&[("query", account_number), ("field", "number")]),
            )
            .await?;
        let results: ListResponse<AccountRead> = decode(response).await?;

        // Search is fuzzy; only an exact account number counts as a match.
        Ok(results.data.into_iter().next().filter(|account| {
            account.attributes.account_number.as_deref() == Some(account_number)
        }))
    }

    async fn create_account(&self, account: &AccountStore) -> Result<(), ClientError> {
        self.send(self.client.traced_post(&self.url("accounts")).json(account))
            .await?;
        Ok(())
    }

    async fn rename_account(&self, account_id: &str, name: &str) -> Result<(), ClientError> {
        self.send(
            self.client
                .traced_put(&self.url(&format!("accounts/{}", account_id)))
                .json(&AccountUpdate { name }),
        )
        .await?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRead>, ClientError> {
        self.get_all("categories").await
    }

    async fn create_category(&self, name: &str) -> Result<(), ClientError> {
        self.send(
            self.client
                .traced_post(&self.url("categories"))
                .json(&CategoryStore { name }),
        )
        .await?;
        Ok(())
    }

    async fn find_transaction_by_tag(
        &self,
        tag: &str,
    ) -> Result<Option<TransactionGroup>, ClientError> {
        let result = self
            .send(
                self.client
                    .traced_get(&self.url(&format!("tags/{}/transactions", tag))),
            )
            .await;

        let response = match result {
            Ok(response) => response,
            // Firefly 404s for a tag it has never seen.
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => return Ok(None),
            Err(err) => return Err(err),
        };

        let groups: ListResponse<TransactionGroup> = decode(response).await?;
        Ok(groups.data.into_iter().next())
    }

    async fn create_transaction(
        &self,
        transaction: &LedgerTransaction,
    ) -> Result<(), ClientError> {
        self.send(
            self.client
                .traced_post(&self.url("transactions"))
                .json(&TransactionStore {
                    transactions: [transaction],
                }),
        )
        .await?;
        Ok(())
    }

    async fn update_transaction(
        &self,
        group_id: &str,
        update: &SplitUpdate,
    ) -> Result<(), ClientError> {
        self.send(
            self.client
                .traced_put(&self.url(&format!("transactions/{}", group_id)))
                .json(&TransactionUpdate {
                    transactions: [update],
                }),
        )
        .await?;
        Ok(())
    }

    async fn delete_transaction(&self, group_id: &str) -> Result<(), ClientError> {
        self.send(
            self.client
                .traced_delete(&self.url(&format!("transactions/{}", group_id))),
        )
        .await?;
        Ok(())
    }
}
