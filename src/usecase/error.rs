use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::delivery::http::v1::envelope::ApiResponse;
use crate::repository::errors::RepositoryError;

const INTERNAL_ERROR_MESSAGE: &str = "Server error";

#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl UsecaseError {
    pub fn status(&self) -> StatusCode {
        match self {
            UsecaseError::Validation(_) | UsecaseError::Conflict(_) => StatusCode::BAD_REQUEST,
            UsecaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UsecaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller.
    pub fn public_message(&self) -> String {
        match self {
            UsecaseError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<RepositoryError> for UsecaseError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => UsecaseError::NotFound("Resource not found".to_string()),
            RepositoryError::Conflict => UsecaseError::Conflict("Duplicate data".to_string()),
            RepositoryError::DatabaseError(msg) => UsecaseError::Internal(msg),
        }
    }
}

impl IntoResponse for UsecaseError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        match &self {
            UsecaseError::Internal(_) => {
                tracing::error!(error = %self, "internal error");
            }
            UsecaseError::NotFound(_) => {
                tracing::warn!(error = %self, "resource not found");
            }
            UsecaseError::Conflict(_) => {
                tracing::warn!(error = %self, "conflict");
            }
            UsecaseError::Validation(_) => {
                tracing::debug!(error = %self, "validation failed");
            }
        }

        (status, Json(ApiResponse::<()>::failure(self.public_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(UsecaseError::Validation("x".into()).into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(UsecaseError::Conflict("x".into()).into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(UsecaseError::NotFound("x".into()).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            UsecaseError::Internal("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = UsecaseError::Internal("connection refused: 10.0.0.5:5432".to_string());

        assert_eq!(err.public_message(), "Server error");
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = UsecaseError::Validation("Latitude must be between -90 and 90".to_string());

        assert_eq!(err.public_message(), "Latitude must be between -90 and 90");
    }

    #[test]
    fn test_from_repository_error() {
        assert!(matches!(
            UsecaseError::from(RepositoryError::Conflict),
            UsecaseError::Conflict(_)
        ));
        assert!(matches!(
            UsecaseError::from(RepositoryError::NotFound),
            UsecaseError::NotFound(_)
        ));
        assert!(matches!(
            UsecaseError::from(RepositoryError::DatabaseError("boom".to_string())),
            UsecaseError::Internal(msg) if msg == "boom"
        ));
    }
}
