use crate::api::error::Result as ApiResult;
use crate::pipeline::{
    PipelineState, REQUEST_ID_HEADER, Rejection, RouteAccess, StateTrail, resolve_request_id,
};

use ms_auth::{RateLimitDecision, RateLimitKey, RateLimiter, TenantContextBinder};
use ms_core::SecurityContext;
use ms_db::{DbError, ReleaseOutcome, ScopedConnection, TenantScopeManager};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderValue, header, request::Parts};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use log::{debug, error, info, warn};

/// Key used when the peer address is not available (e.g. in-process calls)
const UNKNOWN_CLIENT: &str = "unknown";

/// What the gatekeeper did with one request
pub struct GateOutcome {
    pub request_id: String,
    pub trail: StateTrail,
    pub response: Response,
}

impl IntoResponse for GateOutcome {
    fn into_response(self) -> Response {
        self.response
    }
}

/// Runs every request through a fixed stage list before its handler sees it:
/// client rate limit, credential, context, tenant quota, scoped connection,
/// dispatch, release.
///
/// Nothing is shared between requests except the limiters' bucket tables and
/// the connection pool.
#[derive(Clone)]
pub struct Gatekeeper {
    ip_limiter: Arc<dyn RateLimiter>,
    tenant_limiter: Arc<dyn RateLimiter>,
    binder: TenantContextBinder,
    scopes: TenantScopeManager,
}

impl Gatekeeper {
    pub fn new(
        ip_limiter: Arc<dyn RateLimiter>,
        tenant_limiter: Arc<dyn RateLimiter>,
        binder: TenantContextBinder,
        scopes: TenantScopeManager,
    ) -> Self {
        Self {
            ip_limiter,
            tenant_limiter,
            binder,
            scopes,
        }
    }

    pub fn scopes(&self) -> &TenantScopeManager {
        &self.scopes
    }

    /// Drop expired buckets from both limiters
    pub fn purge_expired(&self) -> usize {
        self.ip_limiter.purge_expired() + self.tenant_limiter.purge_expired()
    }

    /// Gate one request and, if it passes, run `handler` inside its tenant scope.
    ///
    /// The handler borrows the context and connection for the duration of the
    /// call only. The scope is released whether the handler succeeds or fails,
    /// and a handler that rewrote its marker gets a 500 instead of its response;
    /// if the whole future is dropped, the pool's release hook clears it instead.
    pub async fn run<H>(&self, parts: &Parts, access: RouteAccess, handler: H) -> GateOutcome
    where
        H: for<'c> FnOnce(
                Option<&'c SecurityContext>,
                &'c mut ScopedConnection,
            ) -> BoxFuture<'c, ApiResult<Response>>
            + Send,
    {
        let request_id = resolve_request_id(&parts.headers);
        let mut trail = StateTrail::new();

        let mut response = match self
            .gate(parts, access, handler, &request_id, &mut trail)
            .await
        {
            Ok(response) => {
                metrics::counter!("gatekeeper_requests_total", "outcome" => "dispatched")
                    .increment(1);
                response
            }
            Err(rejection) => {
                let reason = rejection.reason();
                trail.advance(PipelineState::Rejected(reason));
                metrics::counter!("gatekeeper_requests_total", "outcome" => "rejected")
                    .increment(1);
                metrics::counter!("gatekeeper_rejections_total", "reason" => reason.as_str())
                    .increment(1);
                rejection.into_response()
            }
        };

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        GateOutcome {
            request_id,
            trail,
            response,
        }
    }

    async fn gate<H>(
        &self,
        parts: &Parts,
        access: RouteAccess,
        handler: H,
        request_id: &str,
        trail: &mut StateTrail,
    ) -> Result<Response, Rejection>
    where
        H: for<'c> FnOnce(
                Option<&'c SecurityContext>,
                &'c mut ScopedConnection,
            ) -> BoxFuture<'c, ApiResult<Response>>
            + Send,
    {
        // Rate limiting runs before any credential or storage work
        let client_key = RateLimitKey::client(client_address(parts));
        charge(self.ip_limiter.as_ref(), &client_key, request_id)?;
        trail.advance(PipelineState::RateChecked);

        let raw_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        // A credential that is present but bad is refused even on public routes
        let outcome = self.binder.bind(raw_header.as_deref()).map_err(|e| {
            info!(
                "[{request_id}] Credential rejected ({}): {e}",
                e.reason().error_code()
            );
            Rejection::unauthenticated()
        })?;
        trail.advance(PipelineState::CredentialChecked);

        let context = if access.requires_context() {
            let context = outcome.require().map_err(|e| {
                info!(
                    "[{request_id}] Context required ({})",
                    e.reason().error_code()
                );
                Rejection::unauthenticated()
            })?;
            Some(context)
        } else {
            outcome.into_context()
        };
        trail.advance(PipelineState::ContextBound);

        if let Some(context) = &context {
            let tenant_key = RateLimitKey::tenant(context.tenant_id());
            charge(self.tenant_limiter.as_ref(), &tenant_key, request_id)?;
        }

        let mut scoped = self
            .scopes
            .acquire(context.as_ref())
            .await
            .map_err(|e| match e {
                DbError::PoolExhausted { .. } => {
                    warn!("[{request_id}] {e}");
                    Rejection::pool_exhausted()
                }
                other => {
                    error!("[{request_id}] Scope acquisition failed: {other}");
                    Rejection::scope_binding_failed()
                }
            })?;
        trail.advance(PipelineState::ScopeAcquired);

        trail.advance(PipelineState::Dispatched);
        let result = handler(context.as_ref(), &mut scoped).await;

        match self.scopes.release(scoped).await {
            Ok(ReleaseOutcome::Returned) => {}
            Ok(ReleaseOutcome::Discarded) => {
                warn!("[{request_id}] Connection discarded on release");
            }
            Err(e) => {
                // The handler ran under a marker other than its own; drop its response
                error!("[{request_id}] Response withheld: {e}");
                return Err(Rejection::scope_binding_failed());
            }
        }
        trail.advance(PipelineState::Released);

        Ok(match result {
            Ok(response) => response,
            Err(e) => {
                debug!("[{request_id}] Handler failed ({})", e.error_code());
                e.into_response()
            }
        })
    }
}

fn charge(
    limiter: &dyn RateLimiter,
    key: &RateLimitKey,
    request_id: &str,
) -> Result<(), Rejection> {
    match limiter.allow(key) {
        RateLimitDecision::Allowed { .. } => Ok(()),
        RateLimitDecision::Denied { retry_after } => {
            info!(
                "[{request_id}] Rate limit exceeded for {key}, retry after {}ms",
                retry_after.as_millis()
            );
            Err(Rejection::too_many_requests(retry_after))
        }
    }
}

fn client_address(parts: &Parts) -> String {
    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
