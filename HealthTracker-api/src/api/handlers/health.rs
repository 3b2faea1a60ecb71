use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use health_tracker_domain::health::{
    check_pool, system_health, ComponentStatus as DomainComponentStatus, HealthComponent, SystemHealth, SystemStatus,
};

use crate::api::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", "degraded" or "error"
    pub status: String,
    /// Application version from the Cargo manifest
    pub version: String,
    /// Unix timestamp of the response
    pub timestamp: u64,
    /// Seconds since start-up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub components: ComponentStatus,
    pub environment: String,
}

/// Status of individual system components
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    pub database: ComponentHealthStatus,
    pub api: ComponentHealthStatus,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// "ok", "degraded" or "error"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the start-up time used for uptime reporting
pub fn initialize_server_start_time() {
    let _ = SERVER_START_TIME.set(now_secs());
}

fn component_label(status: DomainComponentStatus) -> &'static str {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
}

fn component(health: &SystemHealth, name: &str) -> ComponentHealthStatus {
    match health.components.get(name) {
        Some(c) => ComponentHealthStatus {
            status: component_label(c.status).to_string(),
            message: c.details.clone(),
        },
        None => ComponentHealthStatus {
            status: "ok".to_string(),
            message: None,
        },
    }
}

/// Map a domain health report onto the HTTP status and body
pub fn build_health_response(health: &SystemHealth) -> (StatusCode, HealthResponse) {
    let (code, status) = match health.status {
        SystemStatus::Healthy => (StatusCode::OK, "ok"),
        SystemStatus::Degraded => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        SystemStatus::Unhealthy => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
    };

    let now = now_secs();
    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime: SERVER_START_TIME.get().map(|&start| now.saturating_sub(start)),
        components: ComponentStatus {
            database: component(health, "database"),
            api: component(health, "api"),
        },
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    (code, response)
}

/// Health check endpoint to verify the API is running
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let database = check_pool(&state.pool);
    if database.status != DomainComponentStatus::Healthy {
        warn!("Database health check failed: {:?}", database.details);
    }

    let health = system_health(HashMap::from([
        ("database".to_string(), database),
        (
            "api".to_string(),
            HealthComponent {
                status: DomainComponentStatus::Healthy,
                details: None,
            },
        ),
    ]));

    let (code, response) = build_health_response(&health);
    (code, Json(response))
}
