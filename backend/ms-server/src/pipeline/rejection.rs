use crate::api::error::ErrorBody;
use crate::pipeline::RejectionReason;

use std::time::Duration;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Retry hint sent with `503` when the pool is saturated
const POOL_EXHAUSTED_RETRY_SECS: u64 = 1;

/// A request turned away by the gatekeeper.
///
/// Bodies are deliberately generic; the precise cause goes to the log only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    reason: RejectionReason,
    retry_after: Option<Duration>,
}

impl Rejection {
    pub fn too_many_requests(retry_after: Duration) -> Self {
        Self {
            reason: RejectionReason::TooManyRequests,
            retry_after: Some(retry_after),
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            reason: RejectionReason::Unauthenticated,
            retry_after: None,
        }
    }

    pub fn scope_binding_failed() -> Self {
        Self {
            reason: RejectionReason::ScopeBindingFailed,
            retry_after: None,
        }
    }

    pub fn pool_exhausted() -> Self {
        Self {
            reason: RejectionReason::PoolExhausted,
            retry_after: Some(Duration::from_secs(POOL_EXHAUSTED_RETRY_SECS)),
        }
    }

    pub fn reason(&self) -> RejectionReason {
        self.reason
    }

    pub fn status(&self) -> StatusCode {
        match self.reason {
            RejectionReason::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            RejectionReason::Unauthenticated => StatusCode::UNAUTHORIZED,
            RejectionReason::ScopeBindingFailed => StatusCode::INTERNAL_SERVER_ERROR,
            RejectionReason::PoolExhausted => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whole seconds for `Retry-After`, rounded up and never zero
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after.map(|d| {
            let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
            secs.max(1)
        })
    }

    fn body(&self) -> ErrorBody {
        match self.reason {
            RejectionReason::TooManyRequests => {
                ErrorBody::new("RATE_LIMITED", "Too many requests")
            }
            RejectionReason::Unauthenticated => {
                ErrorBody::new("UNAUTHENTICATED", "Authentication required")
            }
            RejectionReason::ScopeBindingFailed => {
                ErrorBody::new("INTERNAL_ERROR", "Internal server error")
            }
            RejectionReason::PoolExhausted => {
                ErrorBody::new("SERVICE_UNAVAILABLE", "Service temporarily unavailable")
            }
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let mut response = self.body().with_status(self.status());
        let headers = response.headers_mut();

        if let Some(secs) = self.retry_after_secs() {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        if self.reason == RejectionReason::Unauthenticated {
            headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
