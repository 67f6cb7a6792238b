use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use atlaserp_auth::AuthError;

/// Map an auth failure to its HTTP response.
///
/// Credential and token failures collapse to generic client-facing messages;
/// the concrete kind is logged and never leaks into the body.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AuthError::DuplicateIdentity(field) => json_error(
            StatusCode::CONFLICT,
            "duplicate_identity",
            format!("{field} is already registered"),
        ),
        AuthError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Username or password is incorrect",
        ),
        AuthError::AccountLocked { unlock_time } => (
            StatusCode::LOCKED,
            axum::Json(json!({
                "error": "account_locked",
                "message": "Account temporarily locked due to repeated failed logins",
                "unlockTime": unlock_time,
            })),
        )
            .into_response(),
        AuthError::CompanyAccessDenied => json_error(
            StatusCode::FORBIDDEN,
            "company_access_denied",
            "You do not have access to this company",
        ),
        AuthError::TokenExpired
        | AuthError::TokenInvalidSignature
        | AuthError::TokenMalformed
        | AuthError::TokenRevoked => {
            tracing::debug!(kind = %err, "token rejected");
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Authentication required")
        }
        AuthError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
        AuthError::Crypto(msg) => {
            tracing::error!(error = %msg, "cryptography failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
