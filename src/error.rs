use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::storage::StorageError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `SESSION_MISSING`, `SESSION_INVALID`, `INVALID_CREDENTIALS`,
    /// `ROLE_DENIED`, `NOT_FOUND`, `IDENTIFIER_TAKEN`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Identifier must be 1-32 characters")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    SessionMissing,
    SessionInvalid,
    InvalidCredentials,
    /// Valid session, wrong role for the endpoint.
    RoleDenied,
    NotFound(String),
    IdentifierTaken,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::SessionMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "SESSION_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::SessionInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "SESSION_INVALID",
                    message: "Invalid or expired session".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid credentials".into(),
                },
            ),
            // Wrong role is 401, not 403: role-gated endpoints treat a
            // session of the other role the same as no session.
            AppError::RoleDenied => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "ROLE_DENIED",
                    message: "Unauthorized".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::IdentifierTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "IDENTIFIER_TAKEN",
                    message: "Identifier is already registered".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(hash) => {
                AppError::NotFound(format!("File '{hash}' not found"))
            }
            StorageError::InvalidHash(msg) => AppError::Validation(msg),
            StorageError::SizeLimitExceeded { actual, limit } => AppError::Validation(format!(
                "Upload exceeds maximum size ({actual} > {limit} bytes)"
            )),
            other => AppError::Internal(other.to_string()),
        }
    }
}
