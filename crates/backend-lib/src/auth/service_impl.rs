use std::collections::BTreeMap;

use ::metrics::counter;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::auth::{
    AccessClaims, AuthService, FailureOutcome, LockoutTracker, PasswordHasher, TokenError,
    TokenIssuer, TokenKind,
};
use crate::config::Settings;
use crate::error::AppError;
use crate::metrics;
use crate::models::NewUser;
use crate::storage::Storage;
use crate::validation::{
    sanitize_string, validate_login, validate_registration, RegistrationFields, MAX_MATRIC_LENGTH,
};
use kokupocket_common::{
    Ack, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse,
};

/// Lockout key for a submitted matric, cut to the longest matric that
/// registration accepts.
fn lockout_key(matric: &str) -> &str {
    match matric.char_indices().nth(MAX_MATRIC_LENGTH) {
        Some((end, _)) => &matric[..end],
        None => matric,
    }
}

/// Auth flows over a [`Storage`] backend.
///
/// Owns its lockout tracker; nothing is shared process-wide.
pub struct DefaultAuth<S> {
    storage: S,
    hasher: PasswordHasher,
    lockout: LockoutTracker,
    tokens: TokenIssuer,
}

impl<S: Storage> DefaultAuth<S> {
    pub fn new(
        storage: S,
        hasher: PasswordHasher,
        lockout: LockoutTracker,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            storage,
            hasher,
            lockout,
            tokens,
        }
    }

    /// Build every collaborator from validated settings
    pub fn from_settings(storage: S, settings: &Settings) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(settings.password_hash_cost)?;
        let lockout = LockoutTracker::new(settings.max_login_attempts, settings.lock_duration());
        let tokens = TokenIssuer::with_ttls(
            settings.access_token_secret.as_bytes(),
            settings.refresh_token_secret.as_bytes(),
            settings.access_token_ttl(),
            settings.refresh_token_ttl(),
        );
        Ok(Self::new(storage, hasher, lockout, tokens))
    }

    pub fn lockout(&self) -> &LockoutTracker {
        &self.lockout
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Record a failed login against the submitted matric and pick the
    /// response. Unknown matric and wrong password look the same.
    fn reject(&self, matric: &str) -> AppError {
        counter!(metrics::LOGIN_FAILED).increment(1);
        match self.lockout.record_failure(matric) {
            FailureOutcome::Counted { remaining, .. } => {
                debug!(matric, remaining, "login rejected");
                AppError::InvalidCredentials
            },
            FailureOutcome::LockedOut { .. } => {
                counter!(metrics::ACCOUNT_LOCKED).increment(1);
                AppError::AccountLocked
            },
            FailureOutcome::StillLocked { .. } => AppError::AccountLocked,
        }
    }
}

#[async_trait]
impl<S: Storage> AuthService for DefaultAuth<S> {
    async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AppError> {
        let report = validate_registration(RegistrationFields {
            name: req.name.as_deref(),
            matric: req.matric.as_deref(),
            ic: req.ic.as_deref(),
            password: req.password.as_deref(),
        });
        if !report.is_valid() {
            counter!(metrics::REGISTRATION_REJECTED).increment(1);
            return Err(AppError::Validation(report.errors));
        }

        if let Some(confirm) = req.confirm_password.as_deref() {
            if req.password.as_deref() != Some(confirm) {
                counter!(metrics::REGISTRATION_REJECTED).increment(1);
                let mut details = BTreeMap::new();
                details.insert(
                    "confirmPassword".to_string(),
                    "Passwords do not match".to_string(),
                );
                return Err(AppError::Validation(details));
            }
        }

        // Validation guarantees every field is present
        let name = sanitize_string(req.name.as_deref().unwrap_or_default());
        let matric = req.matric.unwrap_or_default();
        let ic = req.ic.unwrap_or_default();
        let password = Zeroizing::new(req.password.unwrap_or_default());

        let password_hash = self.hasher.hash_blocking(password).await?;

        let user = match self
            .storage
            .insert_user(NewUser {
                matric,
                name,
                ic,
                password_hash,
            })
            .await
        {
            Ok(user) => user,
            Err(AppError::DuplicateIdentifier) => {
                counter!(metrics::REGISTRATION_REJECTED).increment(1);
                info!("registration rejected: identifier already registered");
                return Err(AppError::DuplicateIdentifier);
            },
            Err(e) => return Err(e),
        };

        let token = self.tokens.issue_access(user.id, &user.matric)?;

        counter!(metrics::USER_REGISTERED).increment(1);
        info!(user_id = user.id, matric = %user.matric, "user registered");

        Ok(RegisterResponse {
            success: true,
            message: "Registration successful!".to_string(),
            token,
            user_id: user.id,
            name: user.name,
        })
    }

    async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        validate_login(req.matric.as_deref(), req.password.as_deref()).into_result()?;
        let matric = req.matric.unwrap_or_default();
        let password = Zeroizing::new(req.password.unwrap_or_default());
        let key = lockout_key(&matric);

        if self.lockout.is_locked(key) {
            counter!(metrics::LOGIN_BLOCKED).increment(1);
            warn!(matric = key, "login attempt while locked");
            return Err(AppError::AccountLocked);
        }

        // Nothing longer than the key can have been registered
        let user = if key.len() == matric.len() {
            self.storage.find_user_by_matric(&matric).await?
        } else {
            None
        };

        let Some(user) = user else {
            self.hasher.verify_dummy_blocking(password).await?;
            return Err(self.reject(key));
        };

        if !self
            .hasher
            .verify_blocking(user.password_hash.clone(), password)
            .await?
        {
            return Err(self.reject(key));
        }

        self.lockout.record_success(key);

        let token = self.tokens.issue_access(user.id, &user.matric)?;
        let refresh_token = self.tokens.issue_refresh(user.id)?;

        counter!(metrics::LOGIN_SUCCEEDED).increment(1);
        info!(user_id = user.id, "login succeeded");

        Ok(LoginResponse {
            success: true,
            message: "Login successful!".to_string(),
            token,
            refresh_token,
            user_id: user.id,
            name: user.name,
            matric: user.matric,
        })
    }

    async fn refresh(&self, req: RefreshRequest) -> Result<RefreshResponse, AppError> {
        let refresh_token = req
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest("Refresh token required".to_string()))?;

        let user_id = self
            .tokens
            .verify_subject(&refresh_token, TokenKind::Refresh)
            .inspect_err(|e| debug!(error = %e, "refresh token rejected"))?;

        let user = self
            .storage
            .find_user_by_id(user_id)
            .await?
            .ok_or(TokenError::UnknownSubject)?;

        let token = self.tokens.issue_access(user.id, &user.matric)?;
        counter!(metrics::TOKEN_REFRESHED).increment(1);

        Ok(RefreshResponse {
            success: true,
            token,
        })
    }

    async fn logout(&self) -> Ack {
        Ack {
            success: true,
            message: "Logged out".to_string(),
        }
    }

    fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.tokens.verify_access(token)
    }
}
