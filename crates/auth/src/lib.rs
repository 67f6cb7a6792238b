//! `atlaserp-auth` — authentication, session, and authorization core.
//!
//! This crate is intentionally decoupled from HTTP and storage. Persistence,
//! password hashing, and second-factor verification are trait collaborators
//! injected into [`AuthService`]; token signing/verification is pure in-process
//! computation.

pub mod access;
pub mod company;
pub mod config;
pub mod error;
pub mod lockout;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod service;
pub mod store;
pub mod token;
pub mod two_factor;
pub mod user;

pub use access::{CompanyResolution, CompanySummary, SelectedAccess, has_permission};
pub use company::{Company, CompanySettings};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use lockout::{LockoutPolicy, LockoutStatus};
pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use permissions::{Action, Module, PermissionMatrix};
pub use roles::Role;
pub use service::{
    AuthService, AuthSession, LoginInput, LoginOutcome, RefreshedSession, RegisterInput,
    TwoFactorInput,
};
pub use store::{CompanyStore, StoreError, UserStore};
pub use token::{AccessTokenClaims, RefreshTokenClaims, TokenError, TokenService};
pub use two_factor::TwoFactorService;
pub use user::{CompanyAccessGrant, SecurityState, User, UserPreferences};
