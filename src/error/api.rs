use axum::{Json, http::StatusCode, response::IntoResponse};
use mizar_schema::FieldError;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error as ThisError;
use tracing::error;

/// Domain error taxonomy.
///
/// Repositories raise `NotFound`, `Conflict` and `Database`; services add
/// `Validation`; the key guard raises `Unauthorized`. The router boundary
/// (`IntoResponse` below) is the only place an error becomes a transport
/// response.
#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        ApiError::Validation(errors)
    }

    /// Shorthand for a single-field violation.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }

    /// Stable wire code for this error kind.
    pub const fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Database(_) | ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let code = self.code().to_string();
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorObject {
                    code,
                    message: "Request validation failed.".to_string(),
                    details: Some(json!(errors)),
                },
            ),

            ApiError::NotFound(entity) => (
                StatusCode::NOT_FOUND,
                ApiErrorObject {
                    code,
                    message: format!("{entity} not found."),
                    details: None,
                },
            ),

            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                ApiErrorObject {
                    code,
                    message,
                    details: None,
                },
            ),

            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiErrorObject {
                    code,
                    message: "Missing or invalid API key.".to_string(),
                    details: None,
                },
            ),

            // Full detail goes to the log; the caller only sees a stable
            // code and a generic message.
            ApiError::Database(err) => {
                error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorObject {
                        code,
                        message: "An internal server error occurred.".to_string(),
                        details: None,
                    },
                )
            }
            ApiError::Internal(message) => {
                error!(error = %message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorObject {
                        code,
                        message: "An internal server error occurred.".to_string(),
                        details: None,
                    },
                )
            }
        };
        (status, Json(ApiErrorBody { inner: body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn status_table_is_fixed() {
        let cases = [
            (ApiError::invalid_field("title", "bad"), 422),
            (ApiError::NotFound("user"), 404),
            (ApiError::Conflict("dup".to_string()), 409),
            (ApiError::Unauthorized, 401),
            (ApiError::Internal("boom".to_string()), 500),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status().as_u16(), expected);
        }
    }

    #[test]
    fn database_errors_share_the_internal_code() {
        let err = ApiError::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.code(), "internal_error");
        assert_eq!(err.into_response().status().as_u16(), 500);
    }
}
