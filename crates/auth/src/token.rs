//! Access, refresh, and two-factor challenge token issuance/verification.
//!
//! All three token kinds are HS256 JWTs. Access and refresh tokens use
//! separate signing secrets; the two-factor challenge token reuses the access
//! secret but carries a distinct audience and a `purpose` claim, so it is
//! structurally rejected anywhere an access token is expected.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use atlaserp_core::{CompanyId, UserId};

use crate::config::AuthConfig;
use crate::roles::Role;
use crate::user::User;

/// `purpose` claim value of the two-factor challenge token.
const TEMP_2FA_PURPOSE: &str = "temp_2fa";

/// Claims carried by a short-lived bearer access token. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: UserId,
    pub username: String,
    pub email: String,
    /// Company context bound at login/refresh; `None` when the session has no
    /// tenant selected (all module actions deny until one is supplied).
    pub company_id: Option<CompanyId>,
    pub role: Option<Role>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: UserId,
    /// Compared against the stored user on every refresh; a mismatch means
    /// the token was mass-revoked.
    pub token_version: u32,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Claims carried by the two-factor challenge token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoFactorTokenClaims {
    pub sub: UserId,
    pub purpose: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Verification failures, distinguished so callers can react differently
/// (e.g. silent refresh on `Expired` vs. forced re-login on the rest).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is malformed")]
    Malformed,

    #[error("token signing failed: {0}")]
    Signing(String),
}

fn decode_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    }
}

/// Stateless token signing/verification.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    two_factor_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
            two_factor_ttl: config.two_factor_token_ttl,
        }
    }

    /// Audience used by the two-factor challenge token only.
    fn two_factor_audience(&self) -> String {
        format!("{}#2fa", self.audience)
    }

    fn validation(&self, audience: &str) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = 0;
        validation
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl.num_seconds()
    }

    pub fn issue_access_token(
        &self,
        user: &User,
        company_id: Option<CompanyId>,
        role: Option<Role>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = AccessTokenClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            company_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn issue_refresh_token(
        &self,
        user_id: UserId,
        token_version: u32,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = RefreshTokenClaims {
            sub: user_id,
            token_version,
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn issue_two_factor_token(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TwoFactorTokenClaims {
            sub: user_id,
            purpose: TEMP_2FA_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.two_factor_ttl).timestamp(),
            iss: self.issuer.clone(),
            aud: self.two_factor_audience(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &self.access_decoding,
            &self.validation(&self.audience),
        )
        .map(|data| data.claims)
        .map_err(decode_error)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, TokenError> {
        jsonwebtoken::decode::<RefreshTokenClaims>(
            token,
            &self.refresh_decoding,
            &self.validation(&self.audience),
        )
        .map(|data| data.claims)
        .map_err(decode_error)
    }

    pub fn verify_two_factor_token(&self, token: &str) -> Result<TwoFactorTokenClaims, TokenError> {
        let claims = jsonwebtoken::decode::<TwoFactorTokenClaims>(
            token,
            &self.access_decoding,
            &self.validation(&self.two_factor_audience()),
        )
        .map(|data| data.claims)
        .map_err(decode_error)?;

        if claims.purpose != TEMP_2FA_PURPOSE {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig::default())
    }

    fn test_user() -> User {
        User::new(
            "ravi",
            "ravi@example.com",
            "$argon2id$fake",
            "Ravi",
            "Iyer",
            Utc::now(),
        )
    }

    #[test]
    fn access_token_round_trip_recovers_user_and_company() {
        let svc = service();
        let user = test_user();
        let company = CompanyId::new();

        let token = svc
            .issue_access_token(&user, Some(company), Some(Role::Manager), Utc::now())
            .unwrap();
        let claims = svc.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.company_id, Some(company));
        assert_eq!(claims.role, Some(Role::Manager));
        assert_eq!(claims.username, "ravi");
    }

    #[test]
    fn access_token_without_company_context() {
        let svc = service();
        let token = svc
            .issue_access_token(&test_user(), None, None, Utc::now())
            .unwrap();
        let claims = svc.verify_access_token(&token).unwrap();
        assert_eq!(claims.company_id, None);
        assert_eq!(claims.role, None);
    }

    #[test]
    fn expired_access_token_reports_expired() {
        let svc = service();
        let issued = Utc::now() - Duration::hours(2);
        let token = svc
            .issue_access_token(&test_user(), None, None, issued)
            .unwrap();

        assert_eq!(svc.verify_access_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn expired_refresh_token_reports_expired() {
        let svc = service();
        let issued = Utc::now() - Duration::days(8);
        let token = svc
            .issue_refresh_token(UserId::new(), 0, issued)
            .unwrap();

        assert_eq!(svc.verify_refresh_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_reports_invalid_signature() {
        let svc = service();
        let other = TokenService::new(&AuthConfig {
            access_token_secret: "a-different-secret".to_string(),
            ..AuthConfig::default()
        });

        let token = other
            .issue_access_token(&test_user(), None, None, Utc::now())
            .unwrap();

        assert_eq!(
            svc.verify_access_token(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            service().verify_access_token("not.a.jwt"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn refresh_token_round_trip_preserves_version() {
        let svc = service();
        let user_id = UserId::new();
        let token = svc.issue_refresh_token(user_id, 7, Utc::now()).unwrap();
        let claims = svc.verify_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.token_version, 7);
    }

    #[test]
    fn access_token_is_not_accepted_as_refresh_token() {
        let svc = service();
        let token = svc
            .issue_access_token(&test_user(), None, None, Utc::now())
            .unwrap();

        // Separate secrets: the signature check fails before any claim is read.
        assert_eq!(
            svc.verify_refresh_token(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn two_factor_token_is_rejected_by_access_verification() {
        let svc = service();
        let token = svc
            .issue_two_factor_token(UserId::new(), Utc::now())
            .unwrap();

        // Wrong audience and wrong claim shape: structurally malformed as an
        // access token even though the signature checks out.
        assert_eq!(
            svc.verify_access_token(&token),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn two_factor_token_round_trip() {
        let svc = service();
        let user_id = UserId::new();
        let token = svc.issue_two_factor_token(user_id, Utc::now()).unwrap();
        let claims = svc.verify_two_factor_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.purpose, "temp_2fa");
    }
}
