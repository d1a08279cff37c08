//! HTTP error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`; the error becomes a JSON body of
//! the form `{"error": "..."}` with a status chosen from its kind. Server
//! errors are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::schema::OperationError;
use crate::services::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// An operation failed.
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// The request body could not be understood.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// The status code this error is reported with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Operation(err) => match err {
                OperationError::NotFound { .. } => StatusCode::NOT_FOUND,
                OperationError::ProductsNotFound => StatusCode::UNPROCESSABLE_ENTITY,
                OperationError::InvalidEmail(_)
                | OperationError::InvalidArgument(_)
                | OperationError::Auth(AuthError::WeakPassword(_)) => {
                    StatusCode::BAD_REQUEST
                }
                OperationError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
                OperationError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
                OperationError::Auth(_)
                | OperationError::Repository(_)
                | OperationError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Operation(OperationError::Repository(RepositoryError::Conflict(msg))) => {
                msg.clone()
            }
            Self::Operation(OperationError::Auth(AuthError::WeakPassword(msg))) => msg.clone(),
            _ if status.is_server_error() => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::Email;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_message() {
        let (status, body) =
            body_of(AppError::from(OperationError::not_found("product", 9))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "product 9 not found");
    }

    #[tokio::test]
    async fn test_conflict_keeps_message() {
        let err = OperationError::Repository(RepositoryError::Conflict(
            "email already registered".to_string(),
        ));
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "email already registered");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let err = OperationError::Repository(RepositoryError::DataCorruption(
            "order 4 belongs to missing customer 2".to_string(),
        ));
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_client_error_statuses() {
        let invalid = Email::parse("no-at-sign").unwrap_err();
        assert_eq!(
            AppError::from(OperationError::from(invalid)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(OperationError::ProductsNotFound).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(OperationError::Auth(AuthError::WeakPassword(
                "too short".to_string()
            )))
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::BadRequest("missing field".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
