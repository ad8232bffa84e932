use crate::api::bound_context;
use crate::{AppState, RouteAccess};

use axum::{
    Json,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub tenant_id: String,
    pub issued_at: i64,
    /// Tenant the storage engine sees on the leased connection
    pub scope_marker: Option<String>,
}

/// GET /api/session
///
/// Reports who the request is bound to, as seen both by the gatekeeper and by
/// the database connection serving it.
pub async fn get_session(State(state): State<AppState>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();

    state
        .gatekeeper
        .run(&parts, RouteAccess::TenantRequired, |context, conn| {
            Box::pin(async move {
                let context = bound_context(context)?;

                let scope_marker = conn.current_marker().await?;

                Ok(Json(SessionResponse {
                    user_id: context.user_id().to_string(),
                    tenant_id: context.tenant_id().to_string(),
                    issued_at: context.issued_at(),
                    scope_marker,
                })
                .into_response())
            })
        })
        .await
        .into_response()
}
