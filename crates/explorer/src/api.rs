//! HTTP API for cost reports, pricing, health checks and Prometheus metrics

use crate::error::ApiError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use explorer_lib::{
    health::{components, ComponentStatus, HealthRegistry},
    observability::ExplorerMetrics,
    pipeline::DEFAULT_SORT_FIELD,
    CostExplorer, CostReport, HostFilter, PricingRate, RateInput, ReportQuery, SortOrder, Summary,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub explorer: Arc<CostExplorer>,
    pub health_registry: HealthRegistry,
    pub metrics: ExplorerMetrics,
    pub page_size: usize,
}

impl AppState {
    pub fn new(
        explorer: Arc<CostExplorer>,
        health_registry: HealthRegistry,
        metrics: ExplorerMetrics,
        page_size: usize,
    ) -> Self {
        Self {
            explorer,
            health_registry,
            metrics,
            page_size,
        }
    }
}

/// Query string of the host listing and summary endpoints
#[derive(Debug, Default, Deserialize)]
pub struct HostsParams {
    pub name: Option<String>,
    /// Comma-separated host group ids
    pub groupids: Option<String>,
    pub show_inactive: Option<String>,
    pub sort: Option<String>,
    pub sortorder: Option<String>,
    pub page: Option<String>,
}

impl HostsParams {
    fn filter(&self) -> HostFilter {
        HostFilter {
            name: self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            group_ids: self
                .groupids
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect(),
            show_inactive: matches!(
                self.show_inactive.as_deref().map(str::trim),
                Some("1") | Some("true") | Some("on")
            ),
        }
    }

    fn into_query(self, page_size: usize) -> ReportQuery {
        let order = match self.sortorder.as_deref().map(str::trim) {
            Some(o) if o.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1);

        ReportQuery {
            filter: self.filter(),
            sort: self
                .sort
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SORT_FIELD.to_string()),
            order,
            page,
            page_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: Summary,
    pub pricing: PricingRate,
}

#[derive(Debug, Deserialize)]
pub struct PricingUpdateRequest {
    pub per_cpu_core: Option<RateInput>,
    pub per_memory_gb: Option<RateInput>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PricingUpdateResponse {
    pub messages: Vec<String>,
    pub pricing: PricingRate,
}

async fn list_hosts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HostsParams>,
) -> Result<Json<CostReport>, ApiError> {
    let query = params.into_query(state.page_size);
    let result = state.explorer.evaluate(&query).await;
    state
        .health_registry
        .record(components::TELEMETRY, &result)
        .await;

    Ok(Json(result?))
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HostsParams>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let result = state.explorer.summarize(&params.filter()).await;
    state
        .health_registry
        .record(components::TELEMETRY, &result)
        .await;

    let (summary, pricing) = result?;
    Ok(Json(SummaryResponse { summary, pricing }))
}

async fn get_pricing(State(state): State<Arc<AppState>>) -> Json<PricingRate> {
    Json(state.explorer.pricing())
}

async fn update_pricing(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PricingUpdateRequest>,
) -> Result<Json<PricingUpdateResponse>, ApiError> {
    let (Some(per_cpu_core), Some(per_memory_gb)) = (request.per_cpu_core, request.per_memory_gb)
    else {
        return Err(ApiError::InvalidInput(
            "per_cpu_core and per_memory_gb are required".to_string(),
        ));
    };
    let updated_by = request
        .updated_by
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "api".to_string());

    let explorer = state.explorer.clone();
    let result = tokio::task::spawn_blocking(move || {
        explorer.update_pricing(&per_cpu_core, &per_memory_gb, &updated_by)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    match &result {
        Ok(_) => state.health_registry.set_healthy(components::PRICING_STORE).await,
        Err(e) if !e.is_invalid_input() => {
            state
                .health_registry
                .set_degraded(components::PRICING_STORE, e.to_string())
                .await
        }
        Err(_) => {}
    }

    let pricing = result?;
    Ok(Json(PricingUpdateResponse {
        messages: vec![
            "Pricing configuration saved".to_string(),
            format!("CPU: ${} per core/hour", pricing.per_cpu_core),
            format!("Memory: ${} per GB/hour", pricing.per_memory_gb),
        ],
        pricing,
    }))
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/hosts", get(list_hosts))
        .route("/api/v1/summary", get(summary))
        .route("/api/v1/pricing", get(get_pricing).put(update_pricing))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
