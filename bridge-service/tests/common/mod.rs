#![allow(dead_code)]

use bridge_service::config::{BridgeConfig, FireflyConfig, UpConfig, WebhookConfig};
use bridge_service::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const PUBLIC_URL: &str = "http://bridge.test";
pub const CALLBACK_URL: &str = "http://bridge.test/webhook";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub up: MockServer,
    pub firefly: MockServer,
    pub client: reqwest::Client,
}

pub fn test_config(up_uri: &str, firefly_uri: &str) -> BridgeConfig {
    BridgeConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
        },
        up: UpConfig {
            api_base_url: up_uri.to_string(),
            token: Secret::new("up-test-token".to_string()),
        },
        firefly: FireflyConfig {
            base_url: firefly_uri.to_string(),
            token: Secret::new("firefly-test-token".to_string()),
            account_currency: "AUD".to_string(),
        },
        webhook: WebhookConfig {
            public_url: PUBLIC_URL.to_string(),
        },
    }
}

fn page(data: Value) -> Value {
    json!({ "data": data, "links": { "prev": null, "next": null } })
}

pub fn up_account(id: &str, name: &str, account_type: &str) -> Value {
    json!({
        "type": "accounts",
        "id": id,
        "attributes": {
            "displayName": name,
            "accountType": account_type,
            "ownershipType": "INDIVIDUAL",
            "balance": { "currencyCode": "AUD", "value": "100.00", "valueInBaseUnits": 10000 },
            "createdAt": "2023-01-01T00:00:00+11:00"
        }
    })
}

pub fn up_category(id: &str, name: &str) -> Value {
    json!({ "type": "categories", "id": id, "attributes": { "name": name } })
}

pub fn firefly_category(id: &str, name: &str) -> Value {
    json!({ "type": "categories", "id": id, "attributes": { "name": name } })
}

pub fn up_transaction(
    id: &str,
    description: &str,
    amount: &str,
    transfer_account: Option<&str>,
) -> Value {
    json!({
        "data": {
            "type": "transactions",
            "id": id,
            "attributes": {
                "status": "HELD",
                "rawText": description.to_uppercase(),
                "description": description,
                "message": null,
                "amount": { "currencyCode": "AUD", "value": amount, "valueInBaseUnits": 0 },
                "foreignAmount": null,
                "createdAt": "2024-03-01T10:00:00+11:00"
            },
            "relationships": {
                "account": { "data": { "type": "accounts", "id": "acc-spending" } },
                "transferAccount": {
                    "data": transfer_account.map(|id| json!({ "type": "accounts", "id": id }))
                },
                "category": { "data": { "type": "categories", "id": "takeaway" } }
            }
        }
    })
}

pub async fn mount_connectivity(up: &MockServer, firefly: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/util/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "meta": { "id": "ping" } })))
        .mount(up)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/about"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "version": "6.1.0" } })))
        .mount(firefly)
        .await;
}

pub async fn mount_webhooks(up: &MockServer, existing: &[&str]) {
    let hooks: Vec<Value> = existing
        .iter()
        .enumerate()
        .map(|(i, url)| {
            json!({
                "type": "webhooks",
                "id": format!("wh-{}", i),
                "attributes": { "url": url, "description": "Firefly" }
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!(hooks))))
        .mount(up)
        .await;
}

pub async fn mount_accounts(up: &MockServer, firefly: &MockServer, account_create_status: u16) {
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([
            up_account("acc-spending", "Spending", "TRANSACTIONAL"),
            up_account("acc-saver", "🏖️ Savings", "SAVER"),
        ]))))
        .mount(up)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/search/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]))))
        .mount(firefly)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(account_create_status).set_body_json(json!({})))
        .mount(firefly)
        .await;
}

pub async fn mount_categories(up: &MockServer, firefly: &MockServer, up_categories: Value, existing: Value) {
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(up_categories)))
        .mount(up)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(existing)))
        .mount(firefly)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(firefly)
        .await;
}

/// Mount everything a successful boot sync needs.
pub async fn mount_bootstrap(up: &MockServer, firefly: &MockServer) {
    mount_connectivity(up, firefly).await;
    mount_webhooks(up, &[CALLBACK_URL]).await;
    mount_accounts(up, firefly, 200).await;
    mount_categories(
        up,
        firefly,
        json!([up_category("takeaway", "Takeaway")]),
        json!([firefly_category("1", "Takeaway")]),
    )
    .await;
}

/// JSON bodies of every request the server received for `method` and `path`.
pub async fn bodies(server: &MockServer, http_method: &str, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r: &&Request| r.method.to_string() == http_method && r.url.path() == request_path)
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}

impl TestApp {
    pub async fn spawn() -> Self {
        let up = MockServer::start().await;
        let firefly = MockServer::start().await;
        mount_bootstrap(&up, &firefly).await;

        let app = Application::build(test_config(&up.uri(), &firefly.uri()))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            up,
            firefly,
            client,
        }
    }

    /// Deliver a webhook event for the given Up transaction.
    pub async fn deliver(&self, event_type: &str, transaction_id: &str) -> reqwest::Response {
        let body = json!({
            "data": {
                "type": "webhook-events",
                "id": "evt-1",
                "attributes": { "eventType": event_type, "createdAt": "2024-03-01T10:00:01+11:00" },
                "relationships": {
                    "webhook": { "data": { "type": "webhooks", "id": "wh-0" } },
                    "transaction": {
                        "data": { "type": "transactions", "id": transaction_id },
                        "links": {
                            "related": format!("{}/transactions/{}", self.up.uri(), transaction_id)
                        }
                    }
                }
            }
        });

        self.client
            .post(format!("{}/webhook", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to deliver webhook")
    }
}
