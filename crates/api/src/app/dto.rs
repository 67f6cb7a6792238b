use serde::Deserialize;
use serde_json::{Value, json};

use atlaserp_auth::{AuthSession, CompanySummary, RefreshedSession, SelectedAccess, User};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub company_code: String,
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username, email, or phone.
    pub identifier: String,
    pub password: String,
    pub company_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorRequest {
    pub temp_token: String,
    pub code: String,
    pub company_code: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

/// Public user summary; never includes the password hash or security block.
pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "firstName": user.first_name,
        "lastName": user.last_name,
        "isSuperAdmin": user.is_super_admin,
        "primaryCompanyId": user.primary_company_id,
    })
}

pub fn company_summary_to_json(company: &CompanySummary) -> Value {
    json!({
        "id": company.id,
        "code": company.code,
        "name": company.name,
    })
}

pub fn selected_company_to_json(selected: &SelectedAccess) -> Value {
    json!({
        "id": selected.company_id,
        "code": selected.company_code,
        "name": selected.company_name,
        "role": selected.role,
    })
}

pub fn session_to_json(session: &AuthSession) -> Value {
    json!({
        "user": user_to_json(&session.user),
        "companies": session
            .companies
            .iter()
            .map(company_summary_to_json)
            .collect::<Vec<_>>(),
        "currentCompany": session.current_company.as_ref().map(selected_company_to_json),
        "accessToken": session.access_token,
        "expiresIn": session.expires_in,
    })
}

pub fn refreshed_to_json(refreshed: &RefreshedSession) -> Value {
    json!({
        "accessToken": refreshed.access_token,
        "expiresIn": refreshed.expires_in,
        "currentCompany": refreshed.current_company.as_ref().map(selected_company_to_json),
    })
}
