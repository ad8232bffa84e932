use crate::{AppState, RouteAccess};

use axum::{
    Json,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RateLimitProbeResponse {
    pub status: &'static str,
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// GET /api/rate-limit
///
/// Public route that does nothing but pass the gatekeeper; useful to watch the
/// client quota run out.
pub async fn rate_limit_probe(State(state): State<AppState>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();

    state
        .gatekeeper
        .run(&parts, RouteAccess::Public, |context, _conn| {
            Box::pin(async move {
                Ok(Json(RateLimitProbeResponse {
                    status: "ok",
                    authenticated: context.is_some(),
                    tenant_id: context.map(|c| c.tenant_id().to_string()),
                })
                .into_response())
            })
        })
        .await
        .into_response()
}
