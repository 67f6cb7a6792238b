//! Authentication configuration.

use chrono::Duration;

use crate::lockout::LockoutPolicy;

/// Configuration for the authentication core.
///
/// Access and refresh tokens are signed with **separate** secrets so that a
/// leaked access-token secret cannot mint long-lived credentials.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    /// `iss` claim, fixed per deployment.
    pub issuer: String,
    /// `aud` claim, fixed per deployment.
    pub audience: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Lifetime of the narrow-purpose two-factor challenge token.
    pub two_factor_token_ttl: Duration,
    pub lockout: LockoutPolicy,
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: "dev-access-secret".to_string(),
            refresh_token_secret: "dev-refresh-secret".to_string(),
            issuer: "atlaserp".to_string(),
            audience: "atlaserp-api".to_string(),
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            two_factor_token_ttl: Duration::minutes(10),
            lockout: LockoutPolicy::default(),
            min_password_length: 8,
        }
    }
}
