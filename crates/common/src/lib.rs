// ================
// crates/common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the `KokuPocket` client and server.
//! This module defines the JSON request and response payloads of the
//! `/api/auth` and `/api/calc` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Internal numeric user id
pub type UserId = i64;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Account registration payload
///
/// Every field is optional on the wire so that missing fields can be
/// reported per field instead of failing deserialization.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub matric: Option<String>,
    /// 12-digit national ID
    pub ic: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Login payload
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub matric: Option<String>,
    pub password: Option<String>,
}

/// Token refresh payload
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Returned with HTTP 201 after registration
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user_id: UserId,
    pub name: String,
}

/// Returned after a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub refresh_token: String,
    pub user_id: UserId,
    pub name: String,
    pub matric: String,
}

/// Returned after a successful refresh
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub token: String,
}

/// Generic acknowledgment
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ack {
    pub success: bool,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Student registration form saved from the calculator page
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StudentRegistrationRequest {
    pub name: Option<String>,
    pub matric: Option<String>,
    pub ic: Option<String>,
}

/// Response after saving a student registration
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StudentRegistrationResponse {
    pub success: bool,
    pub message: String,
    pub registration_id: i64,
}

/// Score components submitted to the calculator.
///
/// Wire names follow the co-curricular form (`kehadiran`, `penilaian`, ...).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CalculationRequest {
    #[serde(rename = "kehadiran")]
    pub attendance: Option<u32>,
    #[serde(rename = "penilaian")]
    pub assessment: Option<u32>,
    #[serde(rename = "penglibatan")]
    pub involvement: Option<u32>,
    #[serde(rename = "pencapaian")]
    pub achievement: Option<u32>,
    #[serde(rename = "jawatan")]
    pub position: Option<u32>,
    pub bonus: Option<u32>,
}

/// Response after a calculation is stored
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    pub success: bool,
    pub message: String,
    pub calculation_id: i64,
    pub total: u32,
    pub final_percent: f64,
}

/// Public user profile shown on the dashboard
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub matric: String,
    pub created_at: DateTime<Utc>,
}

/// A stored student registration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentRegistration {
    pub id: i64,
    pub user_id: UserId,
    pub name: String,
    pub matric: String,
    pub ic: String,
    pub timestamp: DateTime<Utc>,
}

/// A stored calculation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Calculation {
    pub id: i64,
    pub user_id: UserId,
    #[serde(rename = "kehadiran")]
    pub attendance: u32,
    #[serde(rename = "penilaian")]
    pub assessment: u32,
    #[serde(rename = "penglibatan")]
    pub involvement: u32,
    #[serde(rename = "pencapaian")]
    pub achievement: u32,
    #[serde(rename = "jawatan")]
    pub position: u32,
    pub bonus: u32,
    pub total: u32,
    pub final_percent: f64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated statistics over a user's calculations
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_calculations: usize,
    pub average_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
    pub last_calculation_date: Option<DateTime<Utc>>,
}

/// Everything the dashboard page needs in one response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DashboardResponse {
    pub success: bool,
    pub user: UserProfile,
    pub registrations: Vec<StudentRegistration>,
    pub calculations: Vec<Calculation>,
    pub stats: DashboardStats,
}

/// Calculation history page
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HistoryResponse {
    pub success: bool,
    pub calculations: Vec<Calculation>,
}
