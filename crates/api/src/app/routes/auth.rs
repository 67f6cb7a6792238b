//! Public authentication flows: register, login, two-factor, refresh, logout.
//!
//! The refresh token travels only in an HTTP-only, SameSite-restricted
//! cookie; access tokens are returned in the body and never set as cookies.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::post,
};

use atlaserp_auth::{LoginInput, LoginOutcome, RegisterInput, TwoFactorInput};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const REFRESH_COOKIE: &str = "refresh_token";

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/two-factor", post(two_factor))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let input = RegisterInput {
        username: body.username,
        email: body.email,
        password: body.password,
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
        company_code: body.company_code,
        company_name: body.company_name,
        ip_address: client_ip(&headers),
        user_agent: user_agent(&headers),
    };

    match services.auth.register(input).await {
        Ok(session) => (
            StatusCode::CREATED,
            [(header::SET_COOKIE, session_cookie(&services, &session.refresh_token))],
            Json(dto::session_to_json(&session)),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let input = LoginInput {
        identifier: body.identifier,
        password: body.password,
        company_code: body.company_code,
        ip_address: client_ip(&headers),
        user_agent: user_agent(&headers),
    };

    match services.auth.login(input).await {
        Ok(LoginOutcome::Authenticated(session)) => (
            StatusCode::OK,
            [(header::SET_COOKIE, session_cookie(&services, &session.refresh_token))],
            Json(dto::session_to_json(&session)),
        )
            .into_response(),
        Ok(LoginOutcome::TwoFactorRequired { temp_token }) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "requiresTwoFactor": true,
                "tempToken": temp_token,
            })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

pub async fn two_factor(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    Json(body): Json<dto::TwoFactorRequest>,
) -> axum::response::Response {
    let input = TwoFactorInput {
        temp_token: body.temp_token,
        code: body.code,
        company_code: body.company_code,
        ip_address: client_ip(&headers),
        user_agent: user_agent(&headers),
    };

    match services.auth.complete_two_factor(input).await {
        Ok(session) => (
            StatusCode::OK,
            [(header::SET_COOKIE, session_cookie(&services, &session.refresh_token))],
            Json(dto::session_to_json(&session)),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let Some(token) = refresh_token_from_headers(&headers) else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Authentication required",
        );
    };

    match services.auth.refresh(&token).await {
        Ok(refreshed) => (StatusCode::OK, Json(dto::refreshed_to_json(&refreshed))).into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// Clears the refresh cookie. Deliberately unauthenticated: a client with a
/// dead access token must still be able to log out.
pub async fn logout(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_refresh_cookie(services.secure_cookies))],
        Json(serde_json::json!({ "loggedOut": true })),
    )
}

// -------------------------
// Cookie + header helpers
// -------------------------

fn session_cookie(services: &AppServices, refresh_token: &str) -> String {
    refresh_cookie(
        refresh_token,
        services.auth.tokens().refresh_ttl_secs(),
        services.secure_cookies,
    )
}

fn refresh_cookie(value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{REFRESH_COOKIE}={value}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Strict");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_refresh_cookie(secure: bool) -> String {
    refresh_cookie("", 0, secure)
}

fn refresh_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == REFRESH_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers.get("x-forwarded-for")?.to_str().ok()?;
    forwarded.split(',').next().map(|ip| ip.trim().to_string())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(str::to_string)
}
