// HTTP API error types mapped onto the standard response envelope.
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::database::DbError;

/// Whether 500 responses include internal detail in `errors`.
/// Set once at startup from APP_ENV; defaults to hidden.
static EXPOSE_DETAIL: OnceLock<bool> = OnceLock::new();

pub fn set_error_detail_exposure(expose: bool) {
    let _ = EXPOSE_DETAIL.set(expose);
}

fn expose_detail() -> bool {
    *EXPOSE_DETAIL.get().unwrap_or(&false)
}

/// HTTP API error with fixed status-code mapping and client-safe messages.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity, with per-field messages
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 500 Internal Server Error; detail goes to the log, not the client
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::Validation { message, .. } => message,
            ApiError::Internal { message, .. } => message,
        }
    }

    fn errors(&self) -> Value {
        match self {
            ApiError::Validation { field_errors, .. } => json!(field_errors),
            ApiError::Internal { detail: Some(detail), .. } if expose_detail() => {
                json!([detail])
            }
            _ => json!([]),
        }
    }
}

// Static constructors, one per taxonomy entry
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn validation(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        ApiError::Validation { message: message.into(), field_errors }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!("internal error: {}", detail);
        ApiError::Internal {
            message: "An error occurred while processing your request".to_string(),
            detail: Some(detail),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => ApiError::not_found("Resource not found"),
            DbError::UnknownColumn(col) => {
                // Programming defect in an accessor allow-list, not a user error
                ApiError::internal(format!("column not allow-listed: {}", col))
            }
            DbError::Sqlx(e) => ApiError::internal(format!("database error: {}", e)),
        }
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        match err {
            crate::auth::TokenError::Generation(msg) => {
                ApiError::internal(format!("token generation failed: {}", msg))
            }
            crate::auth::TokenError::Invalid => {
                ApiError::unauthorized("Invalid or expired token")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({
            "success": false,
            "message": self.message(),
            "errors": self.errors(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::validation("x", HashMap::new()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::internal("boom").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_error_message_is_generic() {
        let err = ApiError::internal("sqlx: connection refused");
        assert!(!err.message().contains("sqlx"));
    }

    #[test]
    fn db_absence_maps_to_not_found() {
        let err: ApiError = DbError::NotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
