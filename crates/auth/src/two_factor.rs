//! Second-factor collaborator boundary.
//!
//! Code generation and delivery live outside this crate; the core only asks
//! whether a user is enrolled and whether a submitted code is valid.

use std::sync::Arc;

use async_trait::async_trait;

use atlaserp_core::UserId;

#[async_trait]
pub trait TwoFactorService: Send + Sync {
    async fn is_enabled(&self, user_id: UserId) -> bool;

    async fn verify_code(&self, user_id: UserId, code: &str) -> bool;
}

/// Collaborator for deployments without a second factor configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TwoFactorDisabled;

#[async_trait]
impl TwoFactorService for TwoFactorDisabled {
    async fn is_enabled(&self, _user_id: UserId) -> bool {
        false
    }

    async fn verify_code(&self, _user_id: UserId, _code: &str) -> bool {
        false
    }
}

#[async_trait]
impl<S> TwoFactorService for Arc<S>
where
    S: TwoFactorService + ?Sized,
{
    async fn is_enabled(&self, user_id: UserId) -> bool {
        (**self).is_enabled(user_id).await
    }

    async fn verify_code(&self, user_id: UserId, code: &str) -> bool {
        (**self).verify_code(user_id, code).await
    }
}
