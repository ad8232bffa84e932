use crate::{AppState, create_order, get_session, health, list_orders, rate_limit_probe};

use axum::{Router, routing::get};

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        // Gated API
        .route("/api/session", get(get_session))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/rate-limit", get(rate_limit_probe))
        .with_state(state)
}
