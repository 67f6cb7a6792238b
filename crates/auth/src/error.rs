//! Authentication error types.
//!
//! The variants here are the *internal* truth; the HTTP layer is responsible
//! for collapsing the security-sensitive ones into generic client-facing
//! messages so that credential and token failures never leak their cause.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::password::PasswordHashError;
use crate::store::StoreError;
use crate::token::TokenError;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Username or email already registered.
    #[error("{0} is already registered")]
    DuplicateIdentity(&'static str),

    /// Wrong identifier or wrong password — deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is locked until {unlock_time}")]
    AccountLocked { unlock_time: DateTime<Utc> },

    #[error("company access denied")]
    CompanyAccessDenied,

    #[error("token has expired")]
    TokenExpired,

    #[error("token signature is invalid")]
    TokenInvalidSignature,

    #[error("token is malformed")]
    TokenMalformed,

    /// Refresh token carries a stale `token_version`.
    #[error("token has been revoked")]
    TokenRevoked,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cryptography failure: {0}")]
    Crypto(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::InvalidSignature => AuthError::TokenInvalidSignature,
            TokenError::Malformed => AuthError::TokenMalformed,
            TokenError::Signing(msg) => AuthError::Crypto(msg),
        }
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Crypto(err.0)
    }
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
