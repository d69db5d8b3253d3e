// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers for the `/api/auth` and `/api/calc` routes.

pub mod auth;
pub mod calc;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Unwrap a JSON body, turning extractor rejections into our error shape
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
