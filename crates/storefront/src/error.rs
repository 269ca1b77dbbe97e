//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures reportable errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`, and every response body uses the same
//! `{"error": {code, message, fields?}}` shape so clients parse one format.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::commerce::ApiError;
use crate::validation::ValidationErrors;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Commerce backend call failed.
    #[error("Commerce API error: {0}")]
    Api(#[from] ApiError),

    /// User input failed validation before reaching the backend.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Api(err) => match err {
                ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
                ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
                ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
                ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
                ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ApiError::Network(_) | ApiError::Server { .. } | ApiError::Decode(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_reportable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_reportable(),
            Self::Session(_) | Self::Internal(_) => true,
            _ => false,
        }
    }

    /// Body for the canonical error envelope. Backend and validation
    /// failures keep their codes and messages; infrastructure failures are
    /// collapsed to a generic message so internals stay private.
    fn body(&self) -> serde_json::Value {
        match self {
            Self::Api(err) => {
                let mut error = serde_json::json!({
                    "message": client_message(err),
                });
                if let Some(code) = err.code() {
                    error["code"] = serde_json::Value::from(code);
                }
                if let ApiError::Validation { fields, .. } = err
                    && !fields.is_empty()
                {
                    error["fields"] = serde_json::json!(fields);
                }
                serde_json::json!({ "error": error })
            }
            Self::Validation(errors) => {
                let mut error = serde_json::json!({
                    "code": "VALIDATION_ERROR",
                    "message": errors
                        .root
                        .clone()
                        .unwrap_or_else(|| "Please correct the highlighted fields.".to_string()),
                });
                if !errors.fields.is_empty() {
                    error["fields"] = serde_json::json!(errors.fields);
                }
                serde_json::json!({ "error": error })
            }
            Self::NotFound(message) => serde_json::json!({
                "error": { "code": "NOT_FOUND", "message": message }
            }),
            Self::Unauthorized(message) => serde_json::json!({
                "error": { "code": "UNAUTHORIZED", "message": message }
            }),
            Self::BadRequest(message) => serde_json::json!({
                "error": { "code": "BAD_REQUEST", "message": message }
            }),
            Self::Session(_) | Self::Internal(_) => serde_json::json!({
                "error": { "code": "INTERNAL", "message": "Internal server error" }
            }),
        }
    }
}

/// Message safe to show the client for a backend failure.
fn client_message(err: &ApiError) -> String {
    match err {
        ApiError::Network(_) | ApiError::Server { .. } | ApiError::Decode(_) => {
            "The store is temporarily unavailable. Please try again.".to_string()
        }
        ApiError::Timeout => "The request timed out. Please try again.".to_string(),
        ApiError::Unauthenticated { message }
        | ApiError::Forbidden { message, .. }
        | ApiError::Validation { message, .. }
        | ApiError::NotFound { message } => message.clone(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_reportable() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after a successful sign-in so later errors
/// can be tied to the account.
pub fn set_sentry_user(customer_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
