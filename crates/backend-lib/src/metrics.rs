// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const USER_REGISTERED: &str = "auth.user.registered";
pub const REGISTRATION_REJECTED: &str = "auth.registration.rejected";
pub const LOGIN_SUCCEEDED: &str = "auth.login.succeeded";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const LOGIN_BLOCKED: &str = "auth.login.blocked";
pub const ACCOUNT_LOCKED: &str = "auth.account.locked";
pub const TOKEN_REFRESHED: &str = "auth.token.refreshed";
pub const CALCULATION_SAVED: &str = "calc.calculation.saved";
