use axum::{Router, routing::get};

pub mod auth;
pub mod system;

/// Router for endpoints that require a verified access token.
pub fn protected_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/whoami/permissions", get(system::whoami_permissions))
}
