//! Custom error types for the chat service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for the chat service
///
/// Store-layer faults are converted to `Internal` at the service boundary;
/// the underlying detail is logged server-side and never reaches the caller.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A unique field (username) is already taken
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials or a bad/expired token
    #[error("Unauthorized")]
    Unauthorized,

    /// A referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Semantically invalid request, e.g. self-friending
    #[error("{0}")]
    InvalidOperation(String),

    /// Store or infrastructure fault
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        error!("Database operation failed: {}", err);
        ApiError::Internal
    }
}

/// Type alias for chat service results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Conflict("taken".into()), StatusCode::CONFLICT),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("missing".into()), StatusCode::NOT_FOUND),
            (
                ApiError::InvalidOperation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err: ApiError = sqlx::Error::PoolClosed.into();
        assert_eq!(err.to_string(), "Internal server error");
    }
}
