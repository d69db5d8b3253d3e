//! Account handlers: register, login, refresh and logout.
use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use super::json_body;
use crate::error::AppError;
use crate::storage::Storage;
use crate::AppState;
use kokupocket_common::{
    Ack, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse,
};

pub async fn register<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let response = state.auth.register(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(state.auth.login(json_body(payload)?).await?))
}

pub async fn refresh<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, AppError> {
    Ok(Json(state.auth.refresh(json_body(payload)?).await?))
}

/// Tokens are stateless, so logging out is the client discarding them
pub async fn logout<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Ack> {
    Json(state.auth.logout().await)
}
