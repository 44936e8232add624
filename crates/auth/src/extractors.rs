//! Axum extractors for authentication
//!
//! Generic over any state `S` where `SessionAuth: FromRef<S>`.
//! This is axum's idiomatic nested-state pattern.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::backend::{SessionAuth, ELEVATED_ROLES};
use crate::claims::SessionPayload;
use crate::error::AuthError;
use crate::types::AuthIdentity;

/// Verified session claims, any role.
///
/// Performs no store lookup; use this for introspection endpoints that
/// resolve the identity themselves.
#[derive(Debug)]
pub struct SessionClaims(pub SessionPayload);

impl<S> FromRequestParts<S> for SessionClaims
where
    SessionAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth = SessionAuth::from_ref(state);
        let claims = auth.session(&parts.headers).ok_or(AuthError::Unauthorized)?;
        Ok(SessionClaims(claims))
    }
}

/// Caller holding the `expert` or `admin` role.
///
/// Use this for knowledge-base mutation and other expert-gated routes.
/// Rejects unauthenticated callers with 401 and farmers with 403.
#[derive(Debug)]
pub struct ElevatedUser(pub AuthIdentity);

impl<S> FromRequestParts<S> for ElevatedUser
where
    SessionAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth = SessionAuth::from_ref(state);
        let identity = auth.require_elevated(&parts.headers, ELEVATED_ROLES).await?;
        Ok(ElevatedUser(identity))
    }
}

/// Caller holding the `admin` role, re-validated against the live user
/// record on every request.
#[derive(Debug)]
pub struct AdminUser(pub AuthIdentity);

impl<S> FromRequestParts<S> for AdminUser
where
    SessionAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth = SessionAuth::from_ref(state);
        let identity = auth.require_admin(&parts.headers).await?;
        Ok(AdminUser(identity))
    }
}
