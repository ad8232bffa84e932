use crate::{AuthError, Result as AuthErrorResult};

use std::panic::Location;

use error_location::ErrorLocation;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of a raw `Authorization` header value.
///
/// `Ok(None)` means no credential was presented at all. A header that is
/// present but does not carry a bearer token is an error, never "absent".
#[track_caller]
pub fn extract_bearer(raw_header: Option<&str>) -> AuthErrorResult<Option<&str>> {
    let Some(raw) = raw_header else {
        return Ok(None);
    };

    if raw.trim().is_empty() {
        return Ok(None);
    }

    let Some(token) = raw.strip_prefix(BEARER_PREFIX) else {
        return Err(AuthError::InvalidScheme {
            location: ErrorLocation::from(Location::caller()),
        });
    };

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Malformed {
            message: "empty bearer token".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(Some(token))
}
