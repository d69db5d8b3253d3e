// ============================
// kokupocket-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `KokuPocket` API server.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod router;
pub mod scoring;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth, LockoutTracker};
use crate::config::Settings;
use crate::storage::Storage;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Handle on the auth service's lockout map, for background sweeping
    pub lockout: LockoutTracker,
    /// Settings the server was started with
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
}

impl<S: Storage + Clone + 'static> AppState<S> {
    /// Create a new application state.
    ///
    /// The auth service gets its own handle on `storage`.
    pub fn new(storage: S, settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;
        let auth = DefaultAuth::from_settings(storage.clone(), settings)?;
        let lockout = auth.lockout().clone();

        Ok(Self {
            auth: Arc::new(auth),
            lockout,
            settings: Arc::new(settings.clone()),
            storage,
        })
    }
}
