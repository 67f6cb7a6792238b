//! Service wiring: store handles and the auth orchestrator.
//!
//! Stores are constructed here and handed to the orchestrator as explicit
//! dependencies. Production deployments swap the in-memory handles for
//! database-backed implementations of the same traits.

use std::sync::Arc;

use atlaserp_auth::{Argon2PasswordHasher, AuthConfig, AuthService};
use atlaserp_infra::stores::{InMemoryCompanyStore, InMemoryTwoFactorService, InMemoryUserStore};

pub type Auth = AuthService<
    Arc<InMemoryUserStore>,
    Arc<InMemoryCompanyStore>,
    Argon2PasswordHasher,
    Arc<InMemoryTwoFactorService>,
>;

pub struct AppServices {
    pub auth: Auth,
    /// Shared user handle for session introspection routes.
    pub users: Arc<InMemoryUserStore>,
    /// Shared handle so enrollment can be managed out of band.
    pub two_factor: Arc<InMemoryTwoFactorService>,
    pub secure_cookies: bool,
}

pub fn build_services(config: AuthConfig, secure_cookies: bool) -> AppServices {
    let users = Arc::new(InMemoryUserStore::new());
    let companies = Arc::new(InMemoryCompanyStore::new());
    let two_factor = Arc::new(InMemoryTwoFactorService::new());

    let auth = AuthService::new(
        users.clone(),
        companies,
        Argon2PasswordHasher::default(),
        two_factor.clone(),
        config,
    );

    AppServices {
        auth,
        users,
        two_factor,
        secure_cookies,
    }
}
