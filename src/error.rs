use std::collections::BTreeMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Per-field validation messages, keyed by request field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// One or more request fields failed validation.
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// A unique value is already taken.
    #[error("Conflict on {field}: {message}")]
    Conflict { field: &'static str, message: &'static str },

    /// The request body could not be understood.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No valid token accompanied the request.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Login failed. Unknown usernames and wrong passwords are not told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The resource does not exist or belongs to someone else.
    #[error("Resource not found")]
    NotFound,

    /// A password hashing error.
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The username taken on registration.
    pub fn username_taken() -> Self {
        AppError::Conflict {
            field: "username",
            message: "username already registered",
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    errors: FieldErrors,
}

fn message(text: impl Into<String>) -> FieldErrors {
    FieldErrors::from([("message".to_string(), vec![text.into()])])
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, message("internal server error"))
            }

            AppError::Pool(ref e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, message("internal server error"))
            }

            AppError::Validation(errors) => {
                tracing::debug!("Validation failed: {:?}", errors.keys().collect::<Vec<_>>());
                (StatusCode::BAD_REQUEST, errors)
            }

            AppError::Conflict { field, message } => {
                tracing::debug!("Conflict on {}", field);
                (
                    StatusCode::BAD_REQUEST,
                    FieldErrors::from([(field.to_string(), vec![message.to_string()])]),
                )
            }

            AppError::BadRequest(reason) => {
                tracing::debug!("Bad request: {}", reason);
                (StatusCode::BAD_REQUEST, message(reason))
            }

            AppError::Unauthenticated => {
                tracing::warn!("Request rejected: unauthorized");
                (StatusCode::UNAUTHORIZED, message("unauthorized"))
            }

            AppError::InvalidCredentials => {
                tracing::warn!("Login rejected");
                (StatusCode::UNAUTHORIZED, message("username or password wrong"))
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, message("not found"))
            }

            AppError::Hashing(ref msg) => {
                tracing::error!("Hashing error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, message("internal server error"))
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, message("internal server error"))
            }
        };

        let body = sonic_rs::to_string(&ErrorEnvelope { errors })
            .unwrap_or_else(|_| r#"{"errors":{"message":["internal server error"]}}"#.to_string());

        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_uses_message_envelope() {
        let (status, body) = render(AppError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"errors": {"message": ["not found"]}}));
    }

    #[tokio::test]
    async fn conflict_is_reported_on_its_field() {
        let (status, body) = render(AppError::username_taken()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["username"][0], "username already registered");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = render(AppError::Internal("pool exhausted".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errors"]["message"][0], "internal server error");
    }
}
