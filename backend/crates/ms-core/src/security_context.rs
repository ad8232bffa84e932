use crate::{CoreError, ErrorLocation, Result as CoreResult};

use std::panic::Location;

/// Upper bound, in bytes, for tenant identifiers accepted into a context
pub const MAX_TENANT_ID_LENGTH: usize = 128;

/// Validated identity of the caller for exactly one request.
///
/// Built once after the bearer token has been verified and dropped when the
/// request completes. Not `Clone`; handlers only ever borrow it.
#[derive(Debug, PartialEq, Eq)]
pub struct SecurityContext {
    user_id: String,
    tenant_id: String,
    issued_at: i64,
}

impl SecurityContext {
    /// Build a context, rejecting identities that are present but empty.
    #[track_caller]
    pub fn try_new(
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
        issued_at: i64,
    ) -> CoreResult<Self> {
        let user_id = user_id.into();
        let tenant_id = tenant_id.into();

        if user_id.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "sub",
                message: "user id cannot be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if tenant_id.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "tenant_id",
                message: "tenant id cannot be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if tenant_id.len() > MAX_TENANT_ID_LENGTH {
            return Err(CoreError::Validation {
                field: "tenant_id",
                message: format!("tenant id exceeds {MAX_TENANT_ID_LENGTH} bytes"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self {
            user_id,
            tenant_id,
            issued_at,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Token issue time (Unix seconds)
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }
}
