//! Persistence boundary consumed by the auth core.
//!
//! Stores are explicitly constructed handles injected into
//! [`crate::AuthService`] — never process-wide singletons. The lockout
//! counter operations are part of the trait so that implementations can make
//! them a single conditional write at the storage layer; the orchestrator
//! never read-modifies-writes security state from its own memory.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use atlaserp_core::{CompanyId, UserId};

use crate::company::Company;
use crate::lockout::LockoutPolicy;
use crate::user::{SecurityState, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A unique key (e.g. username, email, company code) is already taken.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("storage failure: {0}")]
    Backend(String),
}

/// User lookup and mutation.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up an **active** user by username, email, or phone,
    /// case-insensitively. Which field matched is never reported.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn update(&self, user: &User) -> Result<(), StoreError>;

    /// Record one failed login attempt as a **single atomic update** and
    /// return the post-transition security state.
    async fn record_login_failure(
        &self,
        id: UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Result<SecurityState, StoreError>;

    /// Record a successful login as a **single atomic update**.
    async fn record_login_success(
        &self,
        id: UserId,
        now: DateTime<Utc>,
        ip: Option<&str>,
    ) -> Result<(), StoreError>;
}

/// Company lookup and creation.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Case-insensitive lookup by `company_code`.
    async fn find_by_code(&self, code: &str) -> Result<Option<Company>, StoreError>;

    async fn find_by_ids(&self, ids: &[CompanyId]) -> Result<Vec<Company>, StoreError>;

    /// All active companies in stable `company_code` order.
    async fn find_active(&self) -> Result<Vec<Company>, StoreError>;

    async fn insert(&self, company: Company) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_identifier(identifier).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        (**self).insert(user).await
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        (**self).update(user).await
    }

    async fn record_login_failure(
        &self,
        id: UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Result<SecurityState, StoreError> {
        (**self).record_login_failure(id, policy, now).await
    }

    async fn record_login_success(
        &self,
        id: UserId,
        now: DateTime<Utc>,
        ip: Option<&str>,
    ) -> Result<(), StoreError> {
        (**self).record_login_success(id, now, ip).await
    }
}

#[async_trait]
impl<S> CompanyStore for Arc<S>
where
    S: CompanyStore + ?Sized,
{
    async fn find_by_code(&self, code: &str) -> Result<Option<Company>, StoreError> {
        (**self).find_by_code(code).await
    }

    async fn find_by_ids(&self, ids: &[CompanyId]) -> Result<Vec<Company>, StoreError> {
        (**self).find_by_ids(ids).await
    }

    async fn find_active(&self) -> Result<Vec<Company>, StoreError> {
        (**self).find_active().await
    }

    async fn insert(&self, company: Company) -> Result<(), StoreError> {
        (**self).insert(company).await
    }
}
