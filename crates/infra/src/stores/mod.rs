//! Store implementations for the auth core's persistence boundary.

pub mod memory;

pub use memory::{InMemoryCompanyStore, InMemoryTwoFactorService, InMemoryUserStore};
