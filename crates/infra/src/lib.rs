//! `atlaserp-infra` — store implementations behind the auth core's traits.
//!
//! Stores are explicitly constructed handles passed into the orchestrator,
//! never process-wide singletons.

pub mod stores;

pub use stores::{InMemoryCompanyStore, InMemoryTwoFactorService, InMemoryUserStore};
