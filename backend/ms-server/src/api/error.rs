//! Errors raised by handlers once a request is inside its tenant scope.
//!
//! The client gets a code and a safe message. Storage detail stays in the log.

use ms_db::DbError;

use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

/// `{"error": {...}}`, shared by handler errors and gatekeeper rejections
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(ErrorEnvelope { error: self })).into_response()
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {message} {location}")]
    NotFound {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid input: {message} {location}")]
    Validation {
        message: String,
        field: Option<String>,
        location: ErrorLocation,
    },

    #[error("Unusable request: {message} {location}")]
    BadRequest {
        message: String,
        location: ErrorLocation,
    },

    /// Anything the caller cannot fix; `message` never leaves the process
    #[error("Handler failed: {message} {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn validation(message: impl Into<String>, field: &str) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.to_string()),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let body = match self {
            Self::Validation { message, field, .. } => ErrorBody {
                code,
                message,
                field,
            },
            Self::NotFound { message, .. } | Self::BadRequest { message, .. } => {
                ErrorBody::new(code, message)
            }
            internal @ Self::Internal { .. } => {
                log::error!("{internal}");
                ErrorBody::new(code, "Internal server error")
            }
        };

        body.with_status(status)
    }
}

impl From<sqlx::Error> for ApiError {
    #[track_caller]
    fn from(e: sqlx::Error) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match e {
            sqlx::Error::RowNotFound => ApiError::NotFound {
                message: "Record not found".into(),
                location,
            },
            other => ApiError::Internal {
                message: format!("query failed: {other}"),
                location,
            },
        }
    }
}

impl From<DbError> for ApiError {
    #[track_caller]
    fn from(e: DbError) -> Self {
        ApiError::Internal {
            message: format!("{} ({})", e, e.error_code()),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
