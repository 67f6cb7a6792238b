//! In-memory stores for dev/test.
//!
//! The lockout counter operations run the pure state-machine transition
//! inside one write guard — the in-memory equivalent of the single
//! conditional update a database-backed store must perform, so concurrent
//! failed attempts against the same account never lose increments.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use atlaserp_auth::lockout::{self, LockoutPolicy};
use atlaserp_auth::store::{CompanyStore, StoreError, UserStore};
use atlaserp_auth::two_factor::TwoFactorService;
use atlaserp_auth::{Company, SecurityState, User};
use atlaserp_core::{CompanyId, UserId};

fn poisoned(_: impl std::fmt::Debug) -> StoreError {
    StoreError::Backend("store lock poisoned".to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map
            .values()
            .find(|user| user.is_active && user.matches_identifier(identifier))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map
            .values()
            .find(|user| user.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map
            .values()
            .any(|existing| existing.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(StoreError::Duplicate("username"));
        }
        if map
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Duplicate("email"));
        }
        map.insert(user.id, user);
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        match map.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn record_login_failure(
        &self,
        id: UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> Result<SecurityState, StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let user = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        lockout::record_failure(&mut user.security, policy, now);
        user.updated_at = now;
        Ok(user.security.clone())
    }

    async fn record_login_success(
        &self,
        id: UserId,
        now: DateTime<Utc>,
        ip: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let user = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        lockout::record_success(&mut user.security, now, ip);
        user.updated_at = now;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Companies
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory company store.
#[derive(Debug, Default)]
pub struct InMemoryCompanyStore {
    inner: RwLock<HashMap<CompanyId, Company>>,
}

impl InMemoryCompanyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyStore for InMemoryCompanyStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Company>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map
            .values()
            .find(|company| company.company_code.eq_ignore_ascii_case(code.trim()))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[CompanyId]) -> Result<Vec<Company>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn find_active(&self) -> Result<Vec<Company>, StoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut companies: Vec<Company> = map
            .values()
            .filter(|company| company.is_active)
            .cloned()
            .collect();
        companies.sort_by(|a, b| a.company_code.cmp(&b.company_code));
        Ok(companies)
    }

    async fn insert(&self, company: Company) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map
            .values()
            .any(|existing| existing.company_code.eq_ignore_ascii_case(&company.company_code))
        {
            return Err(StoreError::Duplicate("company_code"));
        }
        map.insert(company.id, company);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Two-Factor
// ─────────────────────────────────────────────────────────────────────────────

/// Enrollment-table second factor for dev/test: a user is "enrolled" when a
/// code has been registered for them, and verification is plain equality.
#[derive(Debug, Default)]
pub struct InMemoryTwoFactorService {
    codes: RwLock<HashMap<UserId, String>>,
}

impl InMemoryTwoFactorService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enroll(&self, user_id: UserId, code: &str) {
        if let Ok(mut codes) = self.codes.write() {
            codes.insert(user_id, code.to_string());
        }
    }

    pub fn unenroll(&self, user_id: UserId) {
        if let Ok(mut codes) = self.codes.write() {
            codes.remove(&user_id);
        }
    }
}

#[async_trait]
impl TwoFactorService for InMemoryTwoFactorService {
    async fn is_enabled(&self, user_id: UserId) -> bool {
        self.codes
            .read()
            .map(|codes| codes.contains_key(&user_id))
            .unwrap_or(false)
    }

    async fn verify_code(&self, user_id: UserId, code: &str) -> bool {
        self.codes
            .read()
            .map(|codes| codes.get(&user_id).is_some_and(|expected| expected == code))
            .unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn test_user(username: &str, email: &str) -> User {
        User::new(username, email, "$argon2id$fake", "Test", "User", Utc::now())
    }

    #[tokio::test]
    async fn identifier_lookup_is_case_insensitive_and_skips_inactive_users() {
        let store = InMemoryUserStore::new();
        let mut user = test_user("asha", "asha@example.com");
        user.phone = Some("+15550100".to_string());
        let id = user.id;
        store.insert(user).await.unwrap();

        assert!(store.find_by_identifier("ASHA").await.unwrap().is_some());
        assert!(
            store
                .find_by_identifier("Asha@Example.Com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(store.find_by_identifier("+15550100").await.unwrap().is_some());

        let mut user = store.find_by_id(id).await.unwrap().unwrap();
        user.is_active = false;
        store.update(&user).await.unwrap();

        assert!(store.find_by_identifier("asha").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_rejected() {
        let store = InMemoryUserStore::new();
        store
            .insert(test_user("asha", "asha@example.com"))
            .await
            .unwrap();

        let err = store
            .insert(test_user("ASHA", "different@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate("username"));

        let err = store
            .insert(test_user("different", "ASHA@EXAMPLE.COM"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate("email"));
    }

    #[tokio::test]
    async fn login_failure_recording_trips_the_lock_at_the_threshold() {
        let store = InMemoryUserStore::new();
        let user = test_user("asha", "asha@example.com");
        let id = user.id;
        store.insert(user).await.unwrap();

        let policy = LockoutPolicy::default();
        let now = Utc::now();
        for _ in 0..4 {
            let state = store.record_login_failure(id, &policy, now).await.unwrap();
            assert!(!state.account_locked);
        }
        let state = store.record_login_failure(id, &policy, now).await.unwrap();
        assert!(state.account_locked);

        store.record_login_success(id, now, None).await.unwrap();
        let state = store.find_by_id(id).await.unwrap().unwrap().security;
        assert_eq!(state.failed_login_attempts, 0);
        assert!(!state.account_locked);
    }

    #[tokio::test]
    async fn concurrent_failure_recording_loses_no_increments() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = test_user("asha", "asha@example.com");
        let id = user.id;
        store.insert(user).await.unwrap();

        // High threshold so no attempt trips the lock mid-test.
        let policy = LockoutPolicy {
            max_failed_attempts: 1_000,
            ..LockoutPolicy::default()
        };

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            let policy = policy.clone();
            handles.push(tokio::spawn(async move {
                store
                    .record_login_failure(id, &policy, Utc::now())
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let state = store.find_by_id(id).await.unwrap().unwrap().security;
        assert_eq!(state.failed_login_attempts, 50);
    }

    #[tokio::test]
    async fn company_lookup_is_case_insensitive_and_listing_is_code_ordered() {
        let store = InMemoryCompanyStore::new();
        store
            .insert(Company::new("BETA", "Beta Works", Utc::now()))
            .await
            .unwrap();
        store
            .insert(Company::new("ALPHA", "Alpha Industries", Utc::now()))
            .await
            .unwrap();
        let mut inactive = Company::new("GAMMA", "Gamma Co", Utc::now());
        inactive.is_active = false;
        store.insert(inactive).await.unwrap();

        assert!(store.find_by_code("beta").await.unwrap().is_some());
        assert!(store.find_by_code(" alpha ").await.unwrap().is_some());

        let active = store.find_active().await.unwrap();
        let codes: Vec<&str> = active.iter().map(|c| c.company_code.as_str()).collect();
        assert_eq!(codes, vec!["ALPHA", "BETA"]);
    }

    #[tokio::test]
    async fn duplicate_company_code_is_rejected() {
        let store = InMemoryCompanyStore::new();
        store
            .insert(Company::new("ACME", "Acme", Utc::now()))
            .await
            .unwrap();

        let err = store
            .insert(Company::new("acme", "Acme Again", Utc::now()))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate("company_code"));
    }

    #[tokio::test]
    async fn two_factor_enrollment_gates_and_verifies() {
        let service = InMemoryTwoFactorService::new();
        let user_id = UserId::new();

        assert!(!service.is_enabled(user_id).await);

        service.enroll(user_id, "424242");
        assert!(service.is_enabled(user_id).await);
        assert!(service.verify_code(user_id, "424242").await);
        assert!(!service.verify_code(user_id, "000000").await);

        service.unenroll(user_id);
        assert!(!service.is_enabled(user_id).await);
    }
}
