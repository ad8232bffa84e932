pub mod error;
pub mod orders;
pub mod rate_limit_probe;
pub mod session;

use crate::{ApiError, ApiResult};

use ms_core::SecurityContext;

use std::panic::Location;

use error_location::ErrorLocation;

/// Context of a dispatched tenant route; its absence is a gatekeeper bug, not a client error
#[track_caller]
pub(crate) fn bound_context(context: Option<&SecurityContext>) -> ApiResult<&SecurityContext> {
    match context {
        Some(context) => Ok(context),
        None => Err(ApiError::Internal {
            message: "tenant route dispatched without a security context".into(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}
