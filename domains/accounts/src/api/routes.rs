//! Accounts domain router

use axum::routing::{get, patch, post};
use axum::Router;

use crate::api::handlers::{auth, roles};
use crate::api::state::AccountsState;

/// Build the accounts router with the given state.
pub fn routes(state: AccountsState) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        .route("/api/admin/users/{id}/role", patch(roles::update_role))
        .with_state(state)
}
