//! Login/registration orchestration.
//!
//! Composes the lockout state machine, credential verification, the
//! two-factor gate, company resolution, and the token service into the public
//! auth flows. Collaborators are injected; the orchestrator holds no global
//! state and performs no read-modify-write on lockout counters.

use chrono::{DateTime, Utc};

use atlaserp_core::{CompanyId, UserId};

use crate::access::{self, CompanyResolution, CompanySummary, SelectedAccess};
use crate::company::Company;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::lockout::{self, LockoutStatus};
use crate::password::PasswordHasher;
use crate::permissions::PermissionMatrix;
use crate::roles::Role;
use crate::store::{CompanyStore, StoreError, UserStore};
use crate::token::{AccessTokenClaims, TokenService};
use crate::two_factor::TwoFactorService;
use crate::user::{CompanyAccessGrant, User};

// ─────────────────────────────────────────────────────────────────────────────
// Inputs / Outputs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub company_code: String,
    /// Display name for a company created inline; defaults to the code.
    pub company_name: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    /// Username, email, or phone — matched case-insensitively.
    pub identifier: String,
    pub password: String,
    pub company_code: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TwoFactorInput {
    pub temp_token: String,
    pub code: String,
    pub company_code: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A fully authenticated session with both tokens issued.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds (for the response body).
    pub expires_in: i64,
    pub current_company: Option<SelectedAccess>,
    pub companies: Vec<CompanySummary>,
}

/// Result of a password login: either a session, or a pending second factor.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Authenticated(Box<AuthSession>),
    /// Password verified but the user is enrolled for a second factor; only
    /// the narrow-purpose challenge token is issued at this point.
    TwoFactorRequired { temp_token: String },
}

/// Result of a refresh: a new access token, never a new refresh token.
#[derive(Debug, Clone)]
pub struct RefreshedSession {
    pub access_token: String,
    pub expires_in: i64,
    pub current_company: Option<SelectedAccess>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

/// The login/registration orchestrator.
///
/// Generic over its collaborators so the core has no dependency on any
/// storage or transport crate.
pub struct AuthService<U, C, P, T> {
    users: U,
    companies: C,
    hasher: P,
    two_factor: T,
    tokens: TokenService,
    config: AuthConfig,
}

impl<U, C, P, T> AuthService<U, C, P, T>
where
    U: UserStore,
    C: CompanyStore,
    P: PasswordHasher,
    T: TwoFactorService,
{
    pub fn new(users: U, companies: C, hasher: P, two_factor: T, config: AuthConfig) -> Self {
        let tokens = TokenService::new(&config);
        Self {
            users,
            companies,
            hasher,
            two_factor,
            tokens,
            config,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Validate a bearer access token (middleware entry point). Pure, no IO.
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        Ok(self.tokens.verify_access_token(token)?)
    }

    /// Register a new user, creating the company inline when the code is
    /// unknown. The first user of a newly created company is always its
    /// administrator; joining an existing company starts with no capabilities.
    pub async fn register(&self, input: RegisterInput) -> AuthResult<AuthSession> {
        validate_registration(&input, self.config.min_password_length)?;

        if self
            .users
            .find_by_username(input.username.trim())
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateIdentity("username"));
        }
        if self.users.find_by_email(input.email.trim()).await?.is_some() {
            return Err(AuthError::DuplicateIdentity("email"));
        }

        let now = Utc::now();
        let (company, created) = match self.companies.find_by_code(&input.company_code).await? {
            Some(company) => (company, false),
            None => {
                let name = input
                    .company_name
                    .clone()
                    .unwrap_or_else(|| input.company_code.trim().to_uppercase());
                let company = Company::new(&input.company_code, name, now);
                self.companies.insert(company.clone()).await?;
                tracing::info!(
                    company = %company.company_code,
                    "company created inline at registration"
                );
                (company, true)
            }
        };

        let (role, matrix) = if created {
            (Role::SuperAdmin, PermissionMatrix::full())
        } else {
            (Role::Operator, PermissionMatrix::empty())
        };

        let password_hash = self.hasher.hash(&input.password)?;
        let mut user = User::new(
            input.username.trim(),
            input.email.trim().to_lowercase(),
            password_hash,
            input.first_name.trim(),
            input.last_name.trim(),
            now,
        );
        user.phone = input.phone.clone();
        user.primary_company_id = Some(company.id);
        user.preferences.default_company = Some(company.id);
        user.assign_grant(CompanyAccessGrant::new(company.id, role, matrix, now));

        let resolution = self
            .resolve_for(&user, Some(&company.company_code), now)
            .await?;

        match self.users.insert(user.clone()).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(field)) => return Err(AuthError::DuplicateIdentity(field)),
            Err(other) => return Err(other.into()),
        }

        tracing::info!(user = %user.id, company = %company.company_code, "user registered");
        self.issue_session(user, resolution, now)
    }

    /// Authenticate with identifier + password.
    ///
    /// Ordering is part of the contract: lockout is evaluated **before** the
    /// password is compared, so a locked account fails identically for right
    /// and wrong passwords.
    pub async fn login(&self, input: LoginInput) -> AuthResult<LoginOutcome> {
        let now = Utc::now();

        let Some(user) = self.users.find_by_identifier(input.identifier.trim()).await? else {
            tracing::warn!(
                ip = input.ip_address.as_deref(),
                user_agent = input.user_agent.as_deref(),
                "login failed: unknown identifier"
            );
            return Err(AuthError::InvalidCredentials);
        };

        if let LockoutStatus::Locked { until } = lockout::check(&user.security, now) {
            tracing::warn!(
                user = %user.id,
                ip = input.ip_address.as_deref(),
                user_agent = input.user_agent.as_deref(),
                "login rejected: account locked"
            );
            return Err(AuthError::AccountLocked { unlock_time: until });
        }

        if !self.hasher.verify(&input.password, &user.password_hash)? {
            let security = self
                .users
                .record_login_failure(user.id, &self.config.lockout, now)
                .await?;
            tracing::warn!(
                user = %user.id,
                attempts = security.failed_login_attempts,
                locked = security.account_locked,
                ip = input.ip_address.as_deref(),
                user_agent = input.user_agent.as_deref(),
                "login failed: wrong password"
            );
            return Err(AuthError::InvalidCredentials);
        }

        self.users
            .record_login_success(user.id, now, input.ip_address.as_deref())
            .await?;

        if self.two_factor.is_enabled(user.id).await {
            let temp_token = self.tokens.issue_two_factor_token(user.id, now)?;
            tracing::info!(user = %user.id, "login pending second factor");
            return Ok(LoginOutcome::TwoFactorRequired { temp_token });
        }

        let resolution = match self
            .resolve_for(&user, input.company_code.as_deref(), now)
            .await
        {
            Ok(resolution) => resolution,
            Err(err) => {
                if matches!(err, AuthError::CompanyAccessDenied) {
                    tracing::warn!(
                        user = %user.id,
                        requested = input.company_code.as_deref(),
                        ip = input.ip_address.as_deref(),
                        user_agent = input.user_agent.as_deref(),
                        "company access denied at login"
                    );
                }
                return Err(err);
            }
        };

        let session = self.issue_session(user, resolution, now)?;
        Ok(LoginOutcome::Authenticated(Box::new(session)))
    }

    /// Resume a login that was paused at the two-factor gate.
    pub async fn complete_two_factor(&self, input: TwoFactorInput) -> AuthResult<AuthSession> {
        let now = Utc::now();
        let claims = self.tokens.verify_two_factor_token(&input.temp_token)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.two_factor.verify_code(user.id, &input.code).await {
            tracing::warn!(
                user = %user.id,
                ip = input.ip_address.as_deref(),
                user_agent = input.user_agent.as_deref(),
                "second factor rejected"
            );
            return Err(AuthError::InvalidCredentials);
        }

        let resolution = self
            .resolve_for(&user, input.company_code.as_deref(), now)
            .await?;
        self.issue_session(user, resolution, now)
    }

    /// Mint a new access token from a refresh token. No password re-entry;
    /// company resolution re-runs with no explicit code, so the previously
    /// bound company is kept while it stays valid.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshedSession> {
        let now = Utc::now();
        let claims = self.tokens.verify_refresh_token(refresh_token)?;

        let Some(user) = self
            .users
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
        else {
            tracing::warn!(user = %claims.sub, "refresh rejected: user missing or inactive");
            return Err(AuthError::TokenRevoked);
        };

        if claims.token_version != user.token_version {
            tracing::warn!(
                user = %user.id,
                presented = claims.token_version,
                current = user.token_version,
                "refresh rejected: stale token version"
            );
            return Err(AuthError::TokenRevoked);
        }

        let resolution = self.resolve_for(&user, None, now).await?;
        let selected = resolution.selected;
        let access_token = self.tokens.issue_access_token(
            &user,
            selected.as_ref().map(|s| s.company_id),
            selected.as_ref().map(|s| s.role),
            now,
        )?;

        Ok(RefreshedSession {
            access_token,
            expires_in: self.tokens.access_ttl_secs(),
            current_company: selected,
        })
    }

    /// Invalidate every outstanding refresh token for a user by bumping the
    /// stored `token_version`.
    pub async fn revoke_refresh_tokens(&self, user_id: UserId) -> AuthResult<()> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(StoreError::NotFound)?;
        user.token_version += 1;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        tracing::info!(
            user = %user.id,
            token_version = user.token_version,
            "refresh tokens revoked"
        );
        Ok(())
    }

    /// Load the candidate company universe and run resolution.
    ///
    /// One store round trip: the active listing for super-admins, the
    /// granted companies for everyone else.
    async fn resolve_for(
        &self,
        user: &User,
        requested_code: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<CompanyResolution> {
        let companies = if user.is_super_admin {
            self.companies.find_active().await?
        } else {
            let ids: Vec<CompanyId> = user.current_grants(now).map(|g| g.company_id).collect();
            self.companies.find_by_ids(&ids).await?
        };

        access::resolve(user, requested_code, &companies, now)
            .map_err(|_| AuthError::CompanyAccessDenied)
    }

    fn issue_session(
        &self,
        user: User,
        resolution: CompanyResolution,
        now: DateTime<Utc>,
    ) -> AuthResult<AuthSession> {
        let selected = resolution.selected;
        let access_token = self.tokens.issue_access_token(
            &user,
            selected.as_ref().map(|s| s.company_id),
            selected.as_ref().map(|s| s.role),
            now,
        )?;
        let refresh_token = self
            .tokens
            .issue_refresh_token(user.id, user.token_version, now)?;

        Ok(AuthSession {
            user,
            access_token,
            refresh_token,
            expires_in: self.tokens.access_ttl_secs(),
            current_company: selected,
            companies: resolution.visible,
        })
    }
}

fn validate_registration(input: &RegisterInput, min_password_length: usize) -> AuthResult<()> {
    if input.username.trim().is_empty() {
        return Err(AuthError::validation("username cannot be empty"));
    }
    if input.email.trim().is_empty() || !input.email.contains('@') {
        return Err(AuthError::validation("invalid email format"));
    }
    if input.password.chars().count() < min_password_length {
        return Err(AuthError::validation(format!(
            "password must be at least {min_password_length} characters"
        )));
    }
    if input.company_code.trim().is_empty() {
        return Err(AuthError::validation("company code cannot be empty"));
    }
    Ok(())
}
