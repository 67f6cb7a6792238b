use atlaserp_auth::{AccessTokenClaims, Role};
use atlaserp_core::{CompanyId, UserId};

/// Session context for a request, derived from a verified access token.
///
/// `company_id` is the tenant bound at login/refresh; a session without one
/// is authenticated but denied every module action until a context exists.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    user_id: UserId,
    username: String,
    company_id: Option<CompanyId>,
    role: Option<Role>,
}

impl SessionContext {
    pub fn from_claims(claims: &AccessTokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username.clone(),
            company_id: claims.company_id,
            role: claims.role,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }
}
