use crate::{AuthError, Claims, Result as AuthErrorResult, TokenCodec, extract_bearer};

use ms_core::SecurityContext;

use std::panic::Location;
use std::sync::Arc;

use error_location::ErrorLocation;

/// Result of binding a request's credential
#[derive(Debug)]
pub enum BindOutcome {
    /// No credential was presented; public routes may proceed without identity
    NoCredential,
    /// Credential verified and materialized into a context
    Bound(SecurityContext),
}

impl BindOutcome {
    pub fn context(&self) -> Option<&SecurityContext> {
        match self {
            Self::NoCredential => None,
            Self::Bound(context) => Some(context),
        }
    }

    pub fn into_context(self) -> Option<SecurityContext> {
        match self {
            Self::NoCredential => None,
            Self::Bound(context) => Some(context),
        }
    }

    /// Turn a missing credential into `Unauthenticated` for routes that need identity
    #[track_caller]
    pub fn require(self) -> AuthErrorResult<SecurityContext> {
        match self {
            Self::Bound(context) => Ok(context),
            Self::NoCredential => Err(AuthError::Unauthenticated {
                source: Box::new(AuthError::MissingCredential {
                    location: ErrorLocation::from(Location::caller()),
                }),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// Turns a raw `Authorization` header into a per-request [`SecurityContext`]
#[derive(Clone)]
pub struct TenantContextBinder {
    codec: Arc<TokenCodec>,
}

impl TenantContextBinder {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    #[track_caller]
    pub fn bind(&self, raw_header: Option<&str>) -> AuthErrorResult<BindOutcome> {
        self.bind_at(raw_header, chrono::Utc::now().timestamp())
    }

    #[track_caller]
    pub fn bind_at(&self, raw_header: Option<&str>, now: i64) -> AuthErrorResult<BindOutcome> {
        let token = match extract_bearer(raw_header) {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(BindOutcome::NoCredential),
            Err(e) => return Err(unauthenticated(e)),
        };

        let claims = self.codec.verify_at(token, now).map_err(|e| {
            log::debug!("Bearer token rejected: {}", e.error_code());
            unauthenticated(e)
        })?;

        Self::materialize(claims).map(BindOutcome::Bound)
    }

    /// Second validation layer: a well-signed token can still be incomplete
    #[track_caller]
    fn materialize(claims: Claims) -> AuthErrorResult<SecurityContext> {
        SecurityContext::try_new(claims.sub, claims.tenant_id, claims.iat).map_err(|e| {
            AuthError::InvalidContext {
                message: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}

#[track_caller]
fn unauthenticated(source: AuthError) -> AuthError {
    AuthError::Unauthenticated {
        source: Box::new(source),
        location: ErrorLocation::from(Location::caller()),
    }
}
