//! Authentication and authorization errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Typed guard rejection, mapped 1:1 onto HTTP responses by the route
/// layer.
///
/// Authentication and authorization failures carry 401/403; store I/O
/// failures surface as 500 and are never folded into the auth taxonomy.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No valid session on a role-guarded route
    Unauthorized,
    /// No valid session on an admin-guarded route
    MissingSession,
    /// Token verified but the subject no longer exists in the store
    SessionExpired,
    /// Caller role not in the allowed set
    PermissionDenied,
    /// Caller is not an admin
    AdminRequired,
    /// The user store failed during re-validation
    UserLoadError,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized | AuthError::MissingSession | AuthError::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::PermissionDenied | AuthError::AdminRequired => StatusCode::FORBIDDEN,
            AuthError::UserLoadError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized"),
            AuthError::MissingSession => (
                StatusCode::UNAUTHORIZED,
                "MISSING_SESSION",
                "Missing or invalid session",
            ),
            AuthError::SessionExpired => {
                (StatusCode::UNAUTHORIZED, "SESSION_EXPIRED", "Session expired")
            }
            AuthError::PermissionDenied => {
                (StatusCode::FORBIDDEN, "PERMISSION_DENIED", "Permission denied")
            }
            AuthError::AdminRequired => (
                StatusCode::FORBIDDEN,
                "ADMIN_REQUIRED",
                "Admin privileges required",
            ),
            AuthError::UserLoadError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "USER_LOAD_ERROR",
                "Failed to load user",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
