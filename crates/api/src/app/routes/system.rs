//! Liveness and session introspection.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use atlaserp_auth::{Action, Module, UserStore};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "userId": session.user_id(),
        "username": session.username(),
        "companyId": session.company_id(),
        "role": session.role(),
    }))
}

/// Effective allowed actions per module for the session's company context.
/// Dashboards use this to decide which surfaces to render.
pub async fn whoami_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> axum::response::Response {
    let user = match services.users.find_by_id(session.user_id()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return errors::json_error(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required",
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "store failure");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            );
        }
    };

    let now = Utc::now();
    let mut modules = serde_json::Map::new();
    for module in Module::ALL {
        let actions: Vec<&str> = Action::ALL
            .iter()
            .copied()
            .filter(|action| authz::allowed(&user, session.company_id(), module, *action, now))
            .map(|action| action.as_str())
            .collect();
        modules.insert(module.as_str().to_string(), serde_json::json!(actions));
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "companyId": session.company_id(),
            "permissions": modules,
        })),
    )
        .into_response()
}
