//! User records, security state, and company access grants.
//!
//! # Invariants
//! - A user holds **at most one grant per company**; assignment replaces any
//!   prior grant for the same company instead of appending.
//! - Users are soft-deleted via `is_active`; the core never removes records.
//! - The lockout counters in [`SecurityState`] are mutated only through the
//!   store's atomic operations (see [`crate::store::UserStore`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atlaserp_core::{CompanyId, UserId};

use crate::permissions::PermissionMatrix;
use crate::roles::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Security State
// ─────────────────────────────────────────────────────────────────────────────

/// Per-user security bookkeeping mutated on every login attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityState {
    pub failed_login_attempts: u32,
    pub account_locked: bool,
    pub lockout_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub two_factor_enabled: bool,
    pub password_last_changed: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Company Access Grant
// ─────────────────────────────────────────────────────────────────────────────

/// The tenancy link: binds a user to a company with a role and capability set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyAccessGrant {
    pub company_id: CompanyId,
    pub role: Role,
    pub permissions: PermissionMatrix,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub employee_id: Option<String>,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
}

impl CompanyAccessGrant {
    pub fn new(
        company_id: CompanyId,
        role: Role,
        permissions: PermissionMatrix,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            company_id,
            role,
            permissions,
            department: None,
            designation: None,
            employee_id: None,
            is_active: true,
            joined_at,
            left_at: None,
        }
    }

    /// Whether the grant is usable at `now`: active and not expired.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.left_at.is_none_or(|left| left > now)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preferences
// ─────────────────────────────────────────────────────────────────────────────

/// User-level preferences consulted during company resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Dashboard default tenant; preferred when no explicit code is requested.
    pub default_company: Option<CompanyId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A user account: identity, security state, and tenancy grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Grants implicit access to every company without stored grants.
    pub is_super_admin: bool,
    pub primary_company_id: Option<CompanyId>,
    /// Soft-delete flag; inactive users never authenticate.
    pub is_active: bool,
    pub security: SecurityState,
    pub company_access: Vec<CompanyAccessGrant>,
    pub preferences: UserPreferences,
    /// Bumped to invalidate all outstanding refresh tokens for this user.
    pub token_version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            phone: None,
            password_hash: password_hash.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            is_super_admin: false,
            primary_company_id: None,
            is_active: true,
            security: SecurityState {
                password_last_changed: Some(now),
                ..SecurityState::default()
            },
            company_access: Vec::new(),
            preferences: UserPreferences::default(),
            token_version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive identifier match on username, email, or phone.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        self.username.eq_ignore_ascii_case(identifier)
            || self.email.eq_ignore_ascii_case(identifier)
            || self
                .phone
                .as_deref()
                .is_some_and(|phone| phone.eq_ignore_ascii_case(identifier))
    }

    /// Assign a grant, replacing any existing grant for the same company.
    pub fn assign_grant(&mut self, grant: CompanyAccessGrant) {
        self.company_access
            .retain(|existing| existing.company_id != grant.company_id);
        self.company_access.push(grant);
    }

    /// Remove the grant for a company, if any.
    pub fn remove_grant(&mut self, company_id: CompanyId) {
        self.company_access
            .retain(|grant| grant.company_id != company_id);
    }

    pub fn grant_for(&self, company_id: CompanyId) -> Option<&CompanyAccessGrant> {
        self.company_access
            .iter()
            .find(|grant| grant.company_id == company_id)
    }

    /// Grants usable at `now`, in stored list order.
    pub fn current_grants(&self, now: DateTime<Utc>) -> impl Iterator<Item = &CompanyAccessGrant> {
        self.company_access
            .iter()
            .filter(move |grant| grant.is_current(now))
    }

    /// Whether the user may act within the given company at all.
    pub fn can_access_company(&self, company_id: CompanyId, now: DateTime<Utc>) -> bool {
        if self.is_super_admin {
            return true;
        }
        self.grant_for(company_id)
            .is_some_and(|grant| grant.is_current(now))
    }
}
