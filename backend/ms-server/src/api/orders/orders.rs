//! Order REST API handlers
//!
//! `orders` and `clients` resolve to the connection's tenant-filtered views;
//! writes through them are refused for any row that is not the caller's tenant.

use crate::api::bound_context;
use crate::{
    ApiError, ApiResult, AppState, CreateOrderRequest, OrderDto, OrderListResponse, RouteAccess,
};

use ms_db::ScopedConnection;

use std::panic::Location;

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use uuid::Uuid;

/// Largest request body accepted by order endpoints
const MAX_BODY_BYTES: usize = 64 * 1024;

const MAX_DESCRIPTION_LENGTH: usize = 500;

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/orders
///
/// List the caller's orders, newest first
pub async fn list_orders(State(state): State<AppState>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();

    state
        .gatekeeper
        .run(&parts, RouteAccess::TenantRequired, |context, conn| {
            Box::pin(async move {
                bound_context(context)?;

                let orders = sqlx::query_as::<_, OrderDto>(
                    r#"
                    SELECT id, tenant_id, client_id, description, total_cents, status, created_at
                    FROM orders
                    ORDER BY created_at DESC, id
                    "#,
                )
                .fetch_all(&mut **conn)
                .await?;

                Ok(Json(OrderListResponse { orders }).into_response())
            })
        })
        .await
        .into_response()
}

/// POST /api/orders
///
/// Create an order for the caller's tenant. The body is only read once the
/// request has passed the gatekeeper.
pub async fn create_order(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    state
        .gatekeeper
        .run(&parts, RouteAccess::TenantRequired, move |context, conn| {
            Box::pin(async move {
                let context = bound_context(context)?;
                let request = parse_body(body).await?;
                validate(&request)?;

                if let Some(client_id) = &request.client_id {
                    ensure_client_visible(conn, client_id).await?;
                }

                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO orders (id, tenant_id, client_id, description, total_cents)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&id)
                .bind(context.tenant_id())
                .bind(&request.client_id)
                .bind(request.description.trim())
                .bind(request.total_cents)
                .execute(&mut **conn)
                .await?;

                let order = sqlx::query_as::<_, OrderDto>(
                    r#"
                    SELECT id, tenant_id, client_id, description, total_cents, status, created_at
                    FROM orders
                    WHERE id = ?
                    "#,
                )
                .bind(&id)
                .fetch_one(&mut **conn)
                .await?;

                log::info!("Order {} created for tenant {}", id, context.tenant_id());

                Ok((StatusCode::CREATED, Json(order)).into_response())
            })
        })
        .await
        .into_response()
}

// =============================================================================
// Helpers
// =============================================================================

async fn parse_body(body: Body) -> ApiResult<CreateOrderRequest> {
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::bad_request(format!("Unreadable request body: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::bad_request(format!("Invalid order payload: {e}")))
}

fn validate(request: &CreateOrderRequest) -> ApiResult<()> {
    let description = request.description.trim();
    if description.is_empty() {
        return Err(ApiError::validation(
            "Description cannot be empty",
            "description",
        ));
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ApiError::validation(
            format!("Description exceeds {MAX_DESCRIPTION_LENGTH} characters"),
            "description",
        ));
    }
    if request.total_cents < 0 {
        return Err(ApiError::validation(
            "Total cannot be negative",
            "total_cents",
        ));
    }
    Ok(())
}

/// The foreign key alone would accept another tenant's client id
async fn ensure_client_visible(conn: &mut ScopedConnection, client_id: &str) -> ApiResult<()> {
    let found = sqlx::query_scalar::<_, String>("SELECT id FROM clients WHERE id = ?")
        .bind(client_id)
        .fetch_optional(&mut **conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound {
            message: format!("Client {client_id} not found"),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
