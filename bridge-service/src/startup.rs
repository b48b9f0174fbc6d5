//! Application startup and lifecycle management.
//!
//! `build` performs the boot-time sync against Up and Firefly before binding;
//! a failure there is fatal and the process never starts serving.

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use service_core::observability::REQUEST_ID_HEADER;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::config::{BridgeConfig, WEBHOOK_PATH};
use crate::handlers::{health_check, metrics_endpoint, readiness_check, webhook::handle_webhook};
use crate::services::{bootstrap, EventProcessor, FireflyClient, UpClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<EventProcessor>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Sync accounts and categories, then bind the HTTP listener.
    pub async fn build(config: BridgeConfig) -> Result<Self, AppError> {
        let bank = Arc::new(UpClient::new(config.up.clone()));
        let ledger = Arc::new(FireflyClient::new(config.firefly.clone()));

        let callback_url = config.webhook.callback_url();
        let snapshot = bootstrap::run(
            bank.as_ref(),
            ledger.as_ref(),
            &callback_url,
            &config.firefly.account_currency,
            chrono::Local::now().date_naive(),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Boot sync failed");
            AppError::from(e)
        })?;

        let processor = EventProcessor::new(bank, ledger, Arc::new(snapshot));
        let state = AppState {
            processor: Arc::new(processor),
        };

        // Port 0 binds a random port for testing
        let addr = format!("{}:{}", config.common.host, config.common.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, webhook = %callback_url, "Bridge service ready");

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics_endpoint))
            .route(WEBHOOK_PATH, post(handle_webhook))
            .layer(from_fn(metrics_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .layer(from_fn(request_id_middleware))
            .with_state(state)
    }

    /// Serve until SIGINT or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = Self::router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
