//! Bearer token guard for the calculator routes.
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::AppError;
use crate::storage::Storage;
use crate::AppState;
use kokupocket_common::UserId;

/// Identity attached to the request once its access token checks out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub matric: String,
}

/// Pull the token out of `Authorization: Bearer <token>`
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Reject requests without a valid access token
pub async fn require_auth<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::MissingToken)?;

    let claims = state.auth.verify_access_token(token).map_err(|e| {
        debug!(error = %e, "access token rejected");
        AppError::Token(e)
    })?;

    request.extensions_mut().insert(AuthUser {
        id: claims.id,
        matric: claims.matric,
    });

    Ok(next.run(request).await)
}
