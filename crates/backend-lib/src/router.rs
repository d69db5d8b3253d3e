// ============================
// kokupocket-backend-lib/src/router.rs
// ============================
//! HTTP router.
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, calc};
use crate::middleware::require_auth;
use crate::storage::Storage;
use crate::AppState;

/// Create the API router
pub fn create_router<S: Storage + Clone + 'static>(state: Arc<AppState<S>>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register::<S>))
        .route("/login", post(auth::login::<S>))
        .route("/refresh", post(auth::refresh::<S>))
        .route("/logout", post(auth::logout::<S>));

    let calc_routes = Router::new()
        .route("/register-student", post(calc::register_student::<S>))
        .route("/calculate", post(calc::calculate::<S>))
        .route("/dashboard", get(calc::dashboard::<S>))
        .route("/history", get(calc::history::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<S>,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/calc", calc_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
