// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod lockout;
pub mod password;
pub mod token;
mod service;
mod service_impl;

pub use lockout::{
    FailureOutcome, LockoutTracker, CLEANUP_INTERVAL, DEFAULT_LOCKOUT_DURATION,
    DEFAULT_MAX_ATTEMPTS, MAX_LOCKOUT_DURATION,
};
pub use password::PasswordHasher;
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{AccessClaims, RefreshClaims, TokenError, TokenIssuer, TokenKind};
