use error_location::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLx error: {source} {location}")]
    Sqlx {
        source: sqlx::Error,
        location: ErrorLocation,
    },

    #[error("Migration error: {message} {location}")]
    Migration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Database initialization failed: {message} {location}")]
    Initialization {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid isolation policy: {message} {location}")]
    InvalidPolicy {
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to bind tenant scope for '{tenant_id}': {message} {location}")]
    ScopeBindingFailed {
        tenant_id: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Tenant marker changed during a lease bound to {expected:?}: {message} {location}")]
    ScopeTampered {
        expected: Option<String>,
        message: String,
        location: ErrorLocation,
    },

    #[error("No pooled connection available within {timeout:?} {location}")]
    PoolExhausted {
        timeout: Duration,
        location: ErrorLocation,
    },
}

impl DbError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Sqlx { .. } => "DATABASE_ERROR",
            Self::Migration { .. } => "MIGRATION_FAILED",
            Self::Initialization { .. } => "DATABASE_INIT_FAILED",
            Self::InvalidPolicy { .. } => "INVALID_ISOLATION_POLICY",
            Self::ScopeBindingFailed { .. } => "SCOPE_BINDING_FAILED",
            Self::ScopeTampered { .. } => "SCOPE_TAMPERED",
            Self::PoolExhausted { .. } => "POOL_EXHAUSTED",
        }
    }
}

impl From<sqlx::Error> for DbError {
    #[track_caller]
    fn from(source: sqlx::Error) -> Self {
        Self::Sqlx {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
