//! Application error type and its HTTP mapping for the management API.
//!
//! Every variant carries a machine-readable `code` that clients can branch on,
//! a human-readable message and free-form JSON details. The redirect service
//! never serializes these; it renders HTML pages instead (see [`crate::pages`]).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload, also embedded in bulk-operation results.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    Unauthorized {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    NotFound {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    Gone {
        code: &'static str,
        message: String,
        details: Value,
    },
    #[error("{message}")]
    Internal {
        code: &'static str,
        message: String,
        details: Value,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            code: "VALIDATION_ERROR",
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            message: message.into(),
            details: json!({}),
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            code: "NOT_FOUND",
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            code: "CONFLICT",
            message: message.into(),
            details,
        }
    }

    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            code: "GONE",
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            code: "INTERNAL_ERROR",
            message: message.into(),
            details,
        }
    }

    /// Replaces the machine-readable code, keeping status and message.
    pub fn with_code(mut self, new_code: &'static str) -> Self {
        match &mut self {
            Self::Validation { code, .. }
            | Self::Unauthorized { code, .. }
            | Self::NotFound { code, .. }
            | Self::Conflict { code, .. }
            | Self::Gone { code, .. }
            | Self::Internal { code, .. } => *code = new_code,
        }
        self
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. }
            | Self::Unauthorized { code, .. }
            | Self::NotFound { code, .. }
            | Self::Conflict { code, .. }
            | Self::Gone { code, .. }
            | Self::Internal { code, .. } => code,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Gone { .. } => StatusCode::GONE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its serializable payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            Self::Validation {
                code,
                message,
                details,
            }
            | Self::Unauthorized {
                code,
                message,
                details,
            }
            | Self::NotFound {
                code,
                message,
                details,
            }
            | Self::Conflict {
                code,
                message,
                details,
            }
            | Self::Gone {
                code,
                message,
                details,
            }
            | Self::Internal {
                code,
                message,
                details,
            } => (*code, message.clone(), details.clone()),
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "Request failed: {}", self);
        }

        let mut response = (
            status,
            Json(ErrorBody {
                error: self.to_error_info(),
            }),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("ApiKey"),
            );
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        AppError::bad_request("Request validation failed", details)
    }
}

/// Maps a database error to an [`AppError`].
///
/// Unique violations on the short-code index become `SHORT_CODE_TAKEN`;
/// everything else is logged and surfaced as a generic internal error.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        let constraint = db.constraint().map(str::to_string);
        let error = AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": constraint }),
        );
        return if constraint.as_deref() == Some("links_short_code_key") {
            error.with_code("SHORT_CODE_TAKEN")
        } else {
            error
        };
    }

    tracing::error!("Database error: {}", e);
    AppError::internal("Database error", json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_codes() {
        assert_eq!(
            AppError::bad_request("x", json!({})).code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::not_found("x", json!({})).code(), "NOT_FOUND");
        assert_eq!(AppError::internal("x", json!({})).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_with_code_keeps_status() {
        let err = AppError::not_found("Project not found", json!({})).with_code("PROJECT_NOT_FOUND");
        assert_eq!(err.code(), "PROJECT_NOT_FOUND");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unauthorized_status() {
        let err = AppError::unauthorized("MISSING_API_KEY", "API key required");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_error_info().code, "MISSING_API_KEY");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::gone("Link expired", json!({})).into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[test]
    fn test_non_database_sqlx_error_is_internal() {
        let err = map_sqlx_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
