use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Malformed token: {message} {location}")]
    Malformed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Token signature does not match {location}")]
    InvalidSignature { location: ErrorLocation },

    #[error("Token expired at {expired_at} {location}")]
    Expired {
        expired_at: i64,
        location: ErrorLocation,
    },

    #[error("Missing authorization header {location}")]
    MissingCredential { location: ErrorLocation },

    #[error("Invalid authorization scheme: expected 'Bearer' {location}")]
    InvalidScheme { location: ErrorLocation },

    #[error("Unauthenticated: {source}")]
    Unauthenticated {
        #[source]
        source: Box<AuthError>,
        location: ErrorLocation,
    },

    #[error("Invalid security context: {message} {location}")]
    InvalidContext {
        message: String,
        location: ErrorLocation,
    },

    #[error("Token signing failed: {source} {location}")]
    Signing {
        #[source]
        source: jsonwebtoken::errors::Error,
        location: ErrorLocation,
    },

    #[error("Unsupported signing algorithm '{algorithm}' {location}")]
    UnsupportedAlgorithm {
        algorithm: String,
        location: ErrorLocation,
    },
}

impl AuthError {
    /// Machine-readable code, safe to log next to the request id
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "MALFORMED_TOKEN",
            Self::InvalidSignature { .. } => "INVALID_SIGNATURE",
            Self::Expired { .. } => "TOKEN_EXPIRED",
            Self::MissingCredential { .. } => "MISSING_AUTH_HEADER",
            Self::InvalidScheme { .. } => "INVALID_AUTH_SCHEME",
            Self::Unauthenticated { .. } => "UNAUTHENTICATED",
            Self::InvalidContext { .. } => "INVALID_CONTEXT",
            Self::Signing { .. } => "SIGNING_FAILED",
            Self::UnsupportedAlgorithm { .. } => "UNSUPPORTED_ALGORITHM",
        }
    }

    /// The innermost failure behind an `Unauthenticated` wrapper
    pub fn reason(&self) -> &AuthError {
        match self {
            Self::Unauthenticated { source, .. } => source.reason(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
