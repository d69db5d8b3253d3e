// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use std::sync::Arc;

use scrypt::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Params, Scrypt,
};
use zeroize::Zeroizing;

use crate::error::AppError;

/// Lowest accepted cost factor (`log2(N)` for scrypt)
pub const MIN_HASH_COST: u8 = 10;

/// Default cost factor
pub const DEFAULT_HASH_COST: u8 = 15;

const BLOCK_SIZE: u32 = 8;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

/// Plaintext behind the hash that unknown-account logins are checked against
const DUMMY_PASSWORD: &str = "kokupocket-dummy-password";

/// Salted scrypt hasher with a configurable cost factor.
///
/// Digests are PHC strings, so verification reads the parameters back out
/// of the stored hash and keeps working after the cost is raised.
#[derive(Clone, Debug)]
pub struct PasswordHasher {
    params: Params,
    /// Hashed at the same cost as real accounts
    dummy_hash: Arc<String>,
}

impl PasswordHasher {
    /// Create a hasher; `cost` is `log2(N)` and must be at least [`MIN_HASH_COST`].
    pub fn new(cost: u8) -> anyhow::Result<Self> {
        anyhow::ensure!(
            cost >= MIN_HASH_COST,
            "password hash cost must be at least {MIN_HASH_COST}, got {cost}"
        );
        let params = Params::new(cost, BLOCK_SIZE, PARALLELISM, OUTPUT_LEN)
            .map_err(|e| anyhow::anyhow!("invalid scrypt parameters: {e}"))?;
        let mut hasher = Self {
            params,
            dummy_hash: Arc::default(),
        };
        hasher.dummy_hash = Arc::new(hasher.hash(DUMMY_PASSWORD)?);
        Ok(hasher)
    }

    /// Hash a password
    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params.clone(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
            .to_string();
        Ok(hash)
    }

    /// Verify a password against a hash. Malformed hashes never verify.
    pub fn verify(&self, hash: &str, plain: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
    }

    /// Hash on the blocking pool; the plaintext is wiped once hashed.
    pub async fn hash_blocking(&self, plain: Zeroizing<String>) -> Result<String, AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await?
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Verify on the blocking pool; the plaintext is wiped afterwards.
    pub async fn verify_blocking(
        &self,
        hash: String,
        plain: Zeroizing<String>,
    ) -> Result<bool, AppError> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&hash, &plain)).await?)
    }

    /// Run a full verification against the dummy hash and discard the result.
    ///
    /// Used when there is no stored hash to check, so a missing account costs
    /// as much as a wrong password.
    pub async fn verify_dummy_blocking(&self, plain: Zeroizing<String>) -> Result<(), AppError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || {
            hasher.verify(&hasher.dummy_hash, &plain);
        })
        .await?;
        Ok(())
    }
}
