//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Database and cache reachable
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Lists zones
/// 2. **Cache**: Key-value store PING
/// 3. **Optimizer**: Reports whether a remote optimizer is configured (never degrades)
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected, 3 zones" },
///     "cache": { "status": "ok", "message": "Connected" },
///     "optimizer": { "status": "ok", "message": "Remote optimizer" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let cache = check_cache(&state).await;
    let optimizer = check_optimizer(&state);

    let all_healthy = database.is_ok() && cache.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            cache,
            optimizer,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.zone_service.list().await {
        Ok(zones) => CheckStatus::ok(format!("Connected, {} zones", zones.len())),
        Err(e) => CheckStatus::error(format!("Database error: {}", e)),
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    if state.kv.health_check().await {
        CheckStatus::ok("Connected")
    } else {
        CheckStatus::error("Key-value store unreachable")
    }
}

fn check_optimizer(state: &AppState) -> CheckStatus {
    if state.optimizer.is_configured() {
        CheckStatus::ok("Remote optimizer")
    } else {
        CheckStatus::ok("Passthrough only")
    }
}
