pub mod api;
pub mod app_state;
pub mod error;
pub mod health;
pub mod logger;
pub mod maintenance;
pub mod pipeline;
pub mod routes;

#[cfg(test)]
mod tests;

pub use api::{
    error::ApiError,
    error::Result as ApiResult,
    orders::{
        create_order_request::CreateOrderRequest,
        order_dto::OrderDto,
        order_list_response::OrderListResponse,
        orders::{create_order, list_orders},
    },
    rate_limit_probe::{RateLimitProbeResponse, rate_limit_probe},
    session::{SessionResponse, get_session},
};
pub use app_state::{AppState, token_codec};
pub use error::{Result as ServerResult, ServerError};
pub use maintenance::{PURGE_INTERVAL, spawn_purge_task};
pub use pipeline::{
    GateOutcome, Gatekeeper, PipelineState, Rejection, RejectionReason, RouteAccess, StateTrail,
};
pub use routes::build_router;
