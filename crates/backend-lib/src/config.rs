// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::password::{DEFAULT_HASH_COST, MIN_HASH_COST};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `KOKUPOCKET_BIND_ADDR`
pub const ENV_PREFIX: &str = "KOKUPOCKET_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Upper bound on token lifetimes (10 years)
const MAX_TOKEN_TTL_SECS: u64 = 60 * 60 * 24 * 365 * 10;

/// Upper bound on the lock duration (10 years)
const MAX_LOCK_TIME_MINUTES: u64 = 60 * 24 * 365 * 10;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Secret for signing access tokens
    pub access_token_secret: String,
    /// Secret for signing refresh tokens; must differ from the access secret
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: u64,
    /// Failed logins before an identifier is locked
    pub max_login_attempts: u32,
    /// How long a lock lasts
    pub lock_time_minutes: u64,
    /// scrypt cost factor (log2 N)
    pub password_hash_cost: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_ttl_secs: 60 * 60 * 24 * 7,   // 7 days
            refresh_token_ttl_secs: 60 * 60 * 24 * 30, // 30 days
            max_login_attempts: 5,
            lock_time_minutes: 15,
            password_hash_cost: DEFAULT_HASH_COST,
        }
    }
}

impl Settings {
    /// Load from `config.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the given TOML file and the environment.
    ///
    /// Later sources win: defaults, the file, `KOKUPOCKET_*` variables, then
    /// the legacy unprefixed variables (`JWT_SECRET`, ...).
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(
                Env::raw()
                    .only(&[
                        "JWT_SECRET",
                        "JWT_REFRESH_SECRET",
                        "MAX_LOGIN_ATTEMPTS",
                        "LOCK_TIME_MINUTES",
                    ])
                    .map(|key| match key.as_str().to_ascii_uppercase().as_str() {
                        "JWT_SECRET" => "access_token_secret".into(),
                        "JWT_REFRESH_SECRET" => "refresh_token_secret".into(),
                        "MAX_LOGIN_ATTEMPTS" => "max_login_attempts".into(),
                        "LOCK_TIME_MINUTES" => "lock_time_minutes".into(),
                        other => other.to_ascii_lowercase().into(),
                    }),
            )
    }

    /// Reject settings the server can't safely run with
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            bail!("invalid log level: {}", self.log_level);
        }
        if self.access_token_secret.is_empty() {
            bail!("access_token_secret must be set");
        }
        if self.refresh_token_secret.is_empty() {
            bail!("refresh_token_secret must be set");
        }
        if self.access_token_secret == self.refresh_token_secret {
            bail!("access and refresh token secrets must differ");
        }
        for ttl in [self.access_token_ttl_secs, self.refresh_token_ttl_secs] {
            if ttl == 0 || ttl > MAX_TOKEN_TTL_SECS {
                bail!("token lifetimes must be between 1 and {MAX_TOKEN_TTL_SECS} seconds");
            }
        }
        if self.max_login_attempts == 0 {
            bail!("max_login_attempts must be at least 1");
        }
        if self.lock_time_minutes == 0 || self.lock_time_minutes > MAX_LOCK_TIME_MINUTES {
            bail!("lock_time_minutes must be between 1 and {MAX_LOCK_TIME_MINUTES}");
        }
        if self.password_hash_cost < MIN_HASH_COST {
            bail!(
                "password_hash_cost must be at least {MIN_HASH_COST}, got {}",
                self.password_hash_cost
            );
        }
        Ok(())
    }

    pub fn lock_duration(&self) -> Duration {
        Duration::from_secs(self.lock_time_minutes.min(MAX_LOCK_TIME_MINUTES) * 60)
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.refresh_token_ttl_secs)
    }
}

fn ttl_from_secs(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(secs.min(MAX_TOKEN_TTL_SECS) as i64)
}
