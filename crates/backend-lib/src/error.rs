// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::TokenError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Matric ID or IC already registered")]
    DuplicateIdentifier,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked. Try again later")]
    AccountLocked,

    #[error("No token provided")]
    MissingToken,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::DuplicateIdentifier => {
                StatusCode::BAD_REQUEST
            },
            AppError::Token(TokenError::Signing(_))
            | AppError::Internal(_)
            | AppError::Io(_)
            | AppError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCredentials | AppError::MissingToken | AppError::Token(_) => {
                StatusCode::UNAUTHORIZED
            },
            AppError::AccountLocked => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::BadRequest(_) => "VAL_002",
            AppError::InvalidCredentials => "AUTH_002",
            AppError::AccountLocked => "AUTH_003",
            AppError::DuplicateIdentifier => "AUTH_004",
            AppError::MissingToken => "AUTH_005",
            AppError::Token(TokenError::Expired) => "TOKEN_EXPIRED",
            AppError::Token(TokenError::Signing(_)) | AppError::Internal(_) => "INT_001",
            AppError::Token(_) => "TOKEN_INVALID",
            AppError::NotFound(_) => "NF_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::DuplicateIdentifier => "Matric ID or IC already registered".to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::AccountLocked => "Account locked. Try again later".to_string(),
            AppError::MissingToken => "No token provided".to_string(),
            AppError::Token(TokenError::Expired) => "Token expired".to_string(),
            AppError::Token(TokenError::Signing(_))
            | AppError::Internal(_)
            | AppError::Io(_)
            | AppError::Json(_) => "An internal server error occurred".to_string(),
            AppError::Token(_) => "Invalid token".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
        }
    }

    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Only internal failures carry details worth hiding; everything else
        // is already a client-safe message.
        let message = if self.is_internal() {
            tracing::error!(code = error_code, error = %self, "request failed");
            if cfg!(debug_assertions) {
                self.to_string()
            } else {
                self.sanitized_message()
            }
        } else {
            self.sanitized_message()
        };

        let body = match &self {
            AppError::Validation(details) => serde_json::json!({
                "error": message,
                "code": error_code,
                "details": details,
            }),
            _ => serde_json::json!({
                "error": message,
                "code": error_code,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Blocking task failed: {err}"))
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
