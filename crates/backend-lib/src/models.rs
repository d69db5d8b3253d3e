// ============================
// crates/backend-lib/src/models.rs
// ============================
//! Persisted records.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kokupocket_common::{UserId, UserProfile};

/// Stored account credentials. Never serialized to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: UserId,
    pub matric: String,
    pub name: String,
    pub ic: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public profile without the national ID or hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            matric: self.matric.clone(),
            created_at: self.created_at,
        }
    }
}

/// A user about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub matric: String,
    pub name: String,
    pub ic: String,
    pub password_hash: String,
}

/// A student registration about to be inserted
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub user_id: UserId,
    pub name: String,
    pub matric: String,
    pub ic: String,
}

/// A scored calculation about to be inserted
#[derive(Debug, Clone)]
pub struct NewCalculation {
    pub user_id: UserId,
    pub attendance: u32,
    pub assessment: u32,
    pub involvement: u32,
    pub achievement: u32,
    pub position: u32,
    pub bonus: u32,
    pub total: u32,
    pub final_percent: f64,
}
