use crate::ApiError;

use std::panic::Location;

use axum::response::IntoResponse;
use error_location::ErrorLocation;
use http::StatusCode;
use http_body_util::BodyExt;

#[tokio::test]
async fn test_not_found_returns_404_with_json_body() {
    let error = ApiError::NotFound {
        message: "Client c-1 not found".into(),
        location: ErrorLocation::from(Location::caller()),
    };
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "Client c-1 not found");
}

#[tokio::test]
async fn test_validation_error_returns_400_with_field() {
    let error = ApiError::validation("Description cannot be empty", "description");
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["field"], "description");
}

#[tokio::test]
async fn test_internal_error_returns_500_without_detail() {
    let error = ApiError::Internal {
        message: "UNIQUE constraint failed: orders.id".into(),
        location: ErrorLocation::from(Location::caller()),
    };
    let response = error.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"]["message"], "Internal server error");
    assert!(json["error"].get("field").is_none());
}

#[test]
fn test_missing_row_converts_to_not_found() {
    let error: ApiError = sqlx::Error::RowNotFound.into();

    assert_eq!(error.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_other_sqlx_error_converts_to_internal() {
    let error: ApiError = sqlx::Error::PoolClosed.into();

    assert_eq!(error.error_code(), "INTERNAL_ERROR");
}

#[test]
fn test_pool_exhausted_converts_to_internal() {
    let error: ApiError = ms_db::DbError::PoolExhausted {
        timeout: std::time::Duration::from_secs(5),
        location: ErrorLocation::from(Location::caller()),
    }
    .into();

    assert_eq!(error.error_code(), "INTERNAL_ERROR");
}
