use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_UP_API_URL: &str = "https://api.up.com.au/api/v1";
pub const DEFAULT_ACCOUNT_CURRENCY: &str = "AUD";
pub const WEBHOOK_PATH: &str = "/webhook";

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub up: UpConfig,
    pub firefly: FireflyConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpConfig {
    pub api_base_url: String,
    pub token: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FireflyConfig {
    /// Instance root, e.g. `https://firefly.example.com`. The API lives under `/api/v1`.
    pub base_url: String,
    pub token: Secret<String>,
    pub account_currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Publicly reachable base URL of this service.
    pub public_url: String,
}

impl WebhookConfig {
    /// The URL Up is asked to deliver events to.
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.public_url.trim_end_matches('/'), WEBHOOK_PATH)
    }
}

impl BridgeConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(BridgeConfig {
            common,
            up: UpConfig {
                api_base_url: get_env("UP_API_URL", Some(DEFAULT_UP_API_URL))?,
                token: Secret::new(get_env("UP_TOKEN", None)?),
            },
            firefly: FireflyConfig {
                base_url: get_env("FIREFLY_URL", None)?,
                token: Secret::new(get_env("FIREFLY_TOKEN", None)?),
                account_currency: get_env("ACCOUNT_CURRENCY", Some(DEFAULT_ACCOUNT_CURRENCY))?,
            },
            webhook: WebhookConfig {
                public_url: get_env("WEBHOOK_URL", None)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}
