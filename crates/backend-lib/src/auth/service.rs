use async_trait::async_trait;

use super::{AccessClaims, TokenError};
use crate::error::AppError;
use kokupocket_common::{
    Ack, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse,
};

/// Account registration and login flows
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, AppError>;
    async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError>;
    async fn refresh(&self, req: RefreshRequest) -> Result<RefreshResponse, AppError>;
    /// Tokens are stateless, so this only acknowledges the request.
    async fn logout(&self) -> Ack;
    fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError>;
}
