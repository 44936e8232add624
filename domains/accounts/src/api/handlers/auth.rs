//! Auth API handlers
//!
//! Implements:
//! - POST /api/auth/login — verify credentials, set the session cookie
//! - POST /api/auth/register — create a farmer account, set the cookie
//! - POST /api/auth/logout — clear the session cookie
//! - GET  /api/auth/session — return the identity for the current session

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use validator::Validate;

use agrisense_auth::{
    ensure_root_admin, AuthError, AuthIdentity, Plan, Role, SessionClaims, SessionPayload,
};
use agrisense_common::{hash_password, verify_password, Error, Result, ValidatedJson};

use crate::api::state::AccountsState;

/// Response shape shared by login, register, and session
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub data: AuthIdentity,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

/// POST /api/auth/login
///
/// The failure message never distinguishes an unknown email from a
/// wrong password.
pub async fn login(
    State(state): State<AccountsState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    ensure_root_admin(state.store.as_ref(), &state.auth.config().root_admin).await?;

    let email = req.email.to_lowercase();
    let user = state
        .store
        .find_by_email(&email)
        .await?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or_else(|| Error::Authentication("Invalid email or password".to_string()))?;

    let payload = SessionPayload::new(user.id.clone(), user.email.clone(), user.role);
    let token = state.auth.codec().sign(&payload)?;
    let jar = jar.add(state.auth.session_cookie(token));

    tracing::debug!(user_id = %user.id, "login successful");

    Ok((
        jar,
        Json(AuthResponse {
            message: "Login successful",
            data: AuthIdentity::from(&user),
        }),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub organization: Option<String>,
}

/// POST /api/auth/register
///
/// New accounts always start as farmer/free; elevation is an admin
/// action.
pub async fn register(
    State(state): State<AccountsState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user = state
        .store
        .create(agrisense_auth::NewUser {
            email: req.email.to_lowercase(),
            name: req.name,
            organization: req.organization,
            password_hash: hash_password(&req.password),
            role: Role::Farmer,
            plan: Plan::Free,
            avatar_url: None,
        })
        .await?;

    let payload = SessionPayload::new(user.id.clone(), user.email.clone(), user.role);
    let token = state.auth.codec().sign(&payload)?;
    let jar = jar.add(state.auth.session_cookie(token));

    tracing::info!(user_id = %user.id, "account registered");

    Ok((
        jar,
        Json(AuthResponse {
            message: "Registration successful",
            data: AuthIdentity::from(&user),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// POST /api/auth/logout
///
/// Logout is client-side only: the cookie is cleared, outstanding Bearer
/// copies of the token stay valid until they age out.
pub async fn logout(
    State(state): State<AccountsState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar.add(state.auth.expired_session_cookie());
    (
        jar,
        Json(LogoutResponse {
            message: "Logged out",
        }),
    )
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub data: AuthIdentity,
}

/// GET /api/auth/session
///
/// Resolves through the configured strategy, so local deployments report
/// the live record rather than the token's copy.
pub async fn session(
    State(state): State<AccountsState>,
    SessionClaims(claims): SessionClaims,
) -> std::result::Result<Json<SessionResponse>, AuthError> {
    let identity = state.auth.resolve(&claims).await?;
    Ok(Json(SessionResponse { data: identity }))
}
