//! Company (tenant) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atlaserp_core::CompanyId;

/// Operational defaults applied to companies created inline at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySettings {
    /// ISO 4217 currency code.
    pub currency: String,
    pub working_hours: WorkingHours,
    /// Default tax rate applied to documents, in percent.
    pub tax_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub opens_at: String,
    pub closes_at: String,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            working_hours: WorkingHours {
                opens_at: "09:00".to_string(),
                closes_at: "17:00".to_string(),
            },
            tax_rate_percent: 0.0,
        }
    }
}

/// A tenant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    /// Unique, uppercase business code used for tenant selection at login.
    pub company_code: String,
    pub name: String,
    pub legal_name: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub settings: CompanySettings,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(company_code: impl AsRef<str>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: CompanyId::new(),
            company_code: company_code.as_ref().trim().to_uppercase(),
            name: name.into(),
            legal_name: None,
            tax_id: None,
            address: None,
            is_active: true,
            settings: CompanySettings::default(),
            created_at: now,
        }
    }
}
