use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::app::services::AppServices;
use crate::context::SessionContext;

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let claims = state
        .services
        .auth
        .verify_access_token(token)
        .map_err(|err| {
            // The concrete failure kind stays in the log; the client only
            // ever sees 401.
            tracing::debug!(kind = %err, "access token rejected");
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut()
        .insert(SessionContext::from_claims(&claims));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
