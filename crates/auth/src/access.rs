//! Company (tenant) context resolution and permission checks.
//!
//! Resolution runs once per login/refresh and fixes the `company_id`/`role`
//! embedded in the issued access token. Permission checks are consulted per
//! authorized request against the grant bound to that context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use atlaserp_core::CompanyId;

use crate::company::Company;
use crate::permissions::{Action, Module, PermissionMatrix};
use crate::roles::Role;
use crate::user::{CompanyAccessGrant, User};

/// A company visible to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanySummary {
    pub id: CompanyId,
    pub code: String,
    pub name: String,
}

/// The tenant context selected for a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedAccess {
    pub company_id: CompanyId,
    pub company_code: String,
    pub company_name: String,
    pub role: Role,
    /// For super-admins this is a synthetic grant, never read from storage.
    pub grant: CompanyAccessGrant,
}

/// Outcome of company resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyResolution {
    pub selected: Option<SelectedAccess>,
    pub visible: Vec<CompanySummary>,
}

/// A regular user requested a company they hold no usable grant for.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("company access denied")]
pub struct CompanyAccessDenied;

/// Pick the tenant context for a session.
///
/// `companies` is the candidate universe: for super-admins the active-company
/// listing, for regular users the companies behind their grants. Inactive
/// companies are ignored in both paths.
pub fn resolve(
    user: &User,
    requested_code: Option<&str>,
    companies: &[Company],
    now: DateTime<Utc>,
) -> Result<CompanyResolution, CompanyAccessDenied> {
    if user.is_super_admin {
        resolve_super_admin(requested_code, companies, now)
    } else {
        resolve_regular(user, requested_code, companies, now)
    }
}

fn summary(company: &Company) -> CompanySummary {
    CompanySummary {
        id: company.id,
        code: company.company_code.clone(),
        name: company.name.clone(),
    }
}

fn resolve_super_admin(
    requested_code: Option<&str>,
    companies: &[Company],
    now: DateTime<Utc>,
) -> Result<CompanyResolution, CompanyAccessDenied> {
    let mut active: Vec<&Company> = companies.iter().filter(|c| c.is_active).collect();
    active.sort_by(|a, b| a.company_code.cmp(&b.company_code));

    // Strict match on an explicit code; no fallback. With no code the first
    // company in code order is a deterministic default, nothing more.
    let selected = match requested_code {
        Some(code) => active
            .iter()
            .find(|c| c.company_code.eq_ignore_ascii_case(code))
            .copied(),
        None => active.first().copied(),
    };

    Ok(CompanyResolution {
        selected: selected.map(|company| synthetic_access(company, now)),
        visible: active.iter().map(|c| summary(c)).collect(),
    })
}

/// On-the-fly grant for a super-admin session: role `SuperAdmin` with a full
/// matrix. The matrix content is irrelevant to permission checks (the role
/// short-circuits them) but keeps the grant shape uniform.
fn synthetic_access(company: &Company, now: DateTime<Utc>) -> SelectedAccess {
    SelectedAccess {
        company_id: company.id,
        company_code: company.company_code.clone(),
        company_name: company.name.clone(),
        role: Role::SuperAdmin,
        grant: CompanyAccessGrant::new(
            company.id,
            Role::SuperAdmin,
            PermissionMatrix::full(),
            now,
        ),
    }
}

fn resolve_regular(
    user: &User,
    requested_code: Option<&str>,
    companies: &[Company],
    now: DateTime<Utc>,
) -> Result<CompanyResolution, CompanyAccessDenied> {
    // Usable pairs: current grant + active company, in grant list order.
    let candidates: Vec<(&CompanyAccessGrant, &Company)> = user
        .current_grants(now)
        .filter_map(|grant| {
            companies
                .iter()
                .find(|c| c.id == grant.company_id && c.is_active)
                .map(|company| (grant, company))
        })
        .collect();

    let selected = match requested_code {
        Some(code) => Some(
            candidates
                .iter()
                .find(|(_, company)| company.company_code.eq_ignore_ascii_case(code))
                .copied()
                .ok_or(CompanyAccessDenied)?,
        ),
        None => {
            let preferred = user.preferences.default_company.and_then(|preferred| {
                candidates
                    .iter()
                    .find(|(grant, _)| grant.company_id == preferred)
                    .copied()
            });
            preferred.or_else(|| candidates.first().copied())
        }
    };

    Ok(CompanyResolution {
        selected: selected.map(|(grant, company)| SelectedAccess {
            company_id: company.id,
            company_code: company.company_code.clone(),
            company_name: company.name.clone(),
            role: grant.role,
            grant: grant.clone(),
        }),
        visible: candidates
            .iter()
            .map(|(_, company)| summary(company))
            .collect(),
    })
}

/// Two-tier permission check for one (module, action) pair.
///
/// Absent or inactive grant denies; `SuperAdmin` allows unconditionally;
/// otherwise the typed capability set decides, with missing entries denied.
pub fn has_permission(grant: Option<&CompanyAccessGrant>, module: Module, action: Action) -> bool {
    match grant {
        None => false,
        Some(grant) if !grant.is_active => false,
        Some(grant) if grant.role.is_super_admin() => true,
        Some(grant) => grant.permissions.allows(module, action),
    }
}
