//! API-side permission guard.
//!
//! Consulted per authorized request against the company context bound into
//! the access token; the token itself never carries the matrix.

use chrono::{DateTime, Utc};

use atlaserp_auth::{Action, Module, User, has_permission};
use atlaserp_core::CompanyId;

/// Decide one (module, action) for a user within an optional company context.
///
/// No company context denies everything; the user-level super-admin flag
/// bypasses grants entirely.
pub fn allowed(
    user: &User,
    company_id: Option<CompanyId>,
    module: Module,
    action: Action,
    now: DateTime<Utc>,
) -> bool {
    if user.is_super_admin {
        return true;
    }
    match company_id {
        Some(company_id) => {
            let grant = user.grant_for(company_id).filter(|g| g.is_current(now));
            has_permission(grant, module, action)
        }
        None => false,
    }
}
