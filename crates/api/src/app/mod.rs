//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: dependency-injected store handles + the auth orchestrator
//! - `routes/`: HTTP routes + handlers (auth flows, session introspection)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use atlaserp_auth::AuthConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AuthConfig, secure_cookies: bool) -> Router {
    let services = Arc::new(services::build_services(config, secure_cookies));
    build_app_with(services)
}

/// Build the router over pre-constructed services (tests inject their own).
pub fn build_app_with(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        services: services.clone(),
    };

    // Protected routes: require a verified access token.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::auth::router())
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}

pub use services::AppServices;
