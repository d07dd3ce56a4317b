//! Cost Explorer - infrastructure cost estimation for monitored hosts
//!
//! Serves cost reports built from the monitoring platform's telemetry and a
//! stored price-per-core / price-per-GB rate.

use anyhow::{Context, Result};
use cost_explorer::{api, config::ExplorerConfig};
use explorer_lib::{
    health::{components, HealthRegistry},
    observability::{ExplorerMetrics, StructuredLogger},
    CostExplorer, JsonFilePricingStore, JsonRpcTelemetry, MetricResolver, PricingStore,
    StaticTelemetry, TelemetryProvider,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const EXPLORER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting cost-explorer");

    let config = ExplorerConfig::load()?;
    info!(
        instance = %config.instance_name,
        pricing_file = %config.pricing_file.display(),
        page_size = config.page_size,
        "Explorer configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::TELEMETRY).await;
    health_registry.register(components::PRICING_STORE).await;

    let metrics = ExplorerMetrics::new();
    let logger = StructuredLogger::new(&config.instance_name);

    let (telemetry, telemetry_source) = match &config.fixture_path {
        Some(path) => {
            let telemetry: Arc<dyn TelemetryProvider> = Arc::new(StaticTelemetry::load(path).await?);
            (telemetry, format!("fixture:{}", path.display()))
        }
        None => {
            let telemetry: Arc<dyn TelemetryProvider> = Arc::new(
                JsonRpcTelemetry::new(&config.telemetry_url, config.telemetry_token.clone())
                    .context("Failed to create telemetry client")?,
            );
            (telemetry, config.telemetry_url.clone())
        }
    };

    if let Err(e) = telemetry.ping().await {
        warn!(error = %e.detail(), "Telemetry API not reachable at startup");
        health_registry
            .set_degraded(components::TELEMETRY, e.detail())
            .await;
    }

    let pricing = Arc::new(JsonFilePricingStore::new(&config.pricing_file));
    let rate = pricing.read();
    info!(
        per_cpu_core = rate.per_cpu_core,
        per_memory_gb = rate.per_memory_gb,
        is_default = rate.is_default,
        "Pricing rate loaded"
    );

    let explorer = CostExplorer::new(
        telemetry,
        pricing,
        MetricResolver::new(config.resolver_config()),
    )
    .with_logger(logger.clone());

    let app_state = Arc::new(api::AppState::new(
        Arc::new(explorer),
        health_registry.clone(),
        metrics,
        config.page_size,
    ));

    health_registry.set_ready(true).await;
    logger.log_startup(EXPLORER_VERSION, config.api_port, &telemetry_source);

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "API server stopped"),
                Err(e) => error!(error = %e, "API server task failed"),
            }
            logger.log_shutdown("API server exited");
        }
        _ = tokio::signal::ctrl_c() => {
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
