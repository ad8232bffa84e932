use crate::AppState;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /health - Component status
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = if ping(&state).await {
        "operational"
    } else {
        "unavailable"
    };

    let health = json!({
        "status": if database == "operational" { "healthy" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "components": {
            "database": database,
            "pool": {
                "size": state.gatekeeper.scopes().pool().size(),
                "idle": state.gatekeeper.scopes().pool().num_idle(),
            },
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(health)).into_response()
}

/// GET /live - Liveness probe (is the process alive?)
pub async fn liveness_check() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - Readiness probe (can the pool serve a query?)
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    if ping(&state).await {
        (StatusCode::OK, "Ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not ready").into_response()
    }
}

/// Probes bypass the tenant scope: they touch no tenant data
async fn ping(state: &AppState) -> bool {
    match sqlx::query("SELECT 1")
        .execute(state.gatekeeper.scopes().pool())
        .await
    {
        Ok(_) => true,
        Err(e) => {
            log::warn!("Database ping failed: {e}");
            false
        }
    }
}
