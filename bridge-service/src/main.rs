use bridge_service::config::BridgeConfig;
use bridge_service::services::init_metrics;
use bridge_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing(
        "bridge-service",
        "info,bridge_service=debug",
        otlp_endpoint.as_deref(),
    );
    init_metrics();

    let config = BridgeConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let application = match Application::build(config).await {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Startup aborted: {}", e);
            std::process::exit(1);
        }
    };

    application.run_until_stopped().await?;

    Ok(())
}
