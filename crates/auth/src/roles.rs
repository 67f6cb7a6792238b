use core::str::FromStr;

use serde::{Deserialize, Serialize};

use atlaserp_core::DomainError;

/// Role a user holds within a single company.
///
/// Roles are the coarse tier of the two-tier permission model: `SuperAdmin`
/// bypasses the per-module matrix entirely, every other role is subject to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Owner,
    Manager,
    Accountant,
    ProductionManager,
    SalesExecutive,
    SecurityGuard,
    Operator,
    Helper,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Accountant => "accountant",
            Role::ProductionManager => "production_manager",
            Role::SalesExecutive => "sales_executive",
            Role::SecurityGuard => "security_guard",
            Role::Operator => "operator",
            Role::Helper => "helper",
        }
    }

    /// Whether this role bypasses the permission matrix unconditionally.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "owner" => Ok(Role::Owner),
            "manager" => Ok(Role::Manager),
            "accountant" => Ok(Role::Accountant),
            "production_manager" => Ok(Role::ProductionManager),
            "sales_executive" => Ok(Role::SalesExecutive),
            "security_guard" => Ok(Role::SecurityGuard),
            "operator" => Ok(Role::Operator),
            "helper" => Ok(Role::Helper),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}
