// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed access and refresh tokens (HS256 JWTs).
//!
//! Access and refresh tokens are signed with independent secrets, so one
//! kind can never be accepted as the other.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use kokupocket_common::UserId;

/// Access token lifetime
pub const ACCESS_TOKEN_TTL: Duration = Duration::days(7);

/// Refresh token lifetime
pub const REFRESH_TOKEN_TTL: Duration = Duration::days(30);

/// Why a token was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token signature invalid")]
    InvalidSignature,

    #[error("token malformed")]
    Malformed,

    #[error("token subject no longer exists")]
    UnknownSubject,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed,
            _ => TokenError::InvalidSignature,
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (internal user id)
    pub id: UserId,
    /// Subject identifier
    pub matric: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    pub id: UserId,
    pub iat: i64,
    pub exp: i64,
}

/// Which secret a token is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Issues and verifies access/refresh tokens
pub struct TokenIssuer {
    access: Keys,
    refresh: Keys,
    access_ttl: Duration,
    refresh_ttl: Duration,
    validation: Validation,
}

impl TokenIssuer {
    /// Create an issuer with the default lifetimes
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self::with_ttls(
            access_secret,
            refresh_secret,
            ACCESS_TOKEN_TTL,
            REFRESH_TOKEN_TTL,
        )
    }

    pub fn with_ttls(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let mut validation = Validation::default();
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 0;

        Self {
            access: Keys::from_secret(access_secret),
            refresh: Keys::from_secret(refresh_secret),
            access_ttl,
            refresh_ttl,
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &Keys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn sign<T: Serialize>(&self, claims: &T, kind: TokenKind) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.keys(kind).encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn check<T: DeserializeOwned>(&self, token: &str, kind: TokenKind) -> Result<T, TokenError> {
        let data = decode::<T>(token, &self.keys(kind).decoding, &self.validation)?;
        Ok(data.claims)
    }

    /// Issue an access token for a user
    pub fn issue_access(&self, id: UserId, matric: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            id,
            matric: matric.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        self.sign(&claims, TokenKind::Access)
    }

    /// Issue a refresh token for a user
    pub fn issue_refresh(&self, id: UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            id,
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
        };
        self.sign(&claims, TokenKind::Refresh)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.check(token, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        self.check(token, TokenKind::Refresh)
    }

    /// Verify a token of either kind, returning only the subject id
    pub fn verify_subject(&self, token: &str, kind: TokenKind) -> Result<UserId, TokenError> {
        match kind {
            TokenKind::Access => self.verify_access(token).map(|c| c.id),
            TokenKind::Refresh => self.verify_refresh(token).map(|c| c.id),
        }
    }
}
