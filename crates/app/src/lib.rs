//! AgriSense application assembly
//!
//! Wires the Postgres-backed store and audit log into the session-auth
//! backend and mounts the accounts routes.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use sqlx::PgPool;

use agrisense_accounts::{AccountsState, PgAuditLog, PgUserStore};
use agrisense_auth::{AuthConfig, RevalidateAgainstStore, SessionAuth};

/// Build the application router.
///
/// This deployment owns its user data, so guards re-validate against the
/// store on every call.
pub fn create_app(auth_config: AuthConfig, pool: PgPool) -> Router {
    let store = Arc::new(PgUserStore::new(pool.clone()));
    let audit = Arc::new(PgAuditLog::new(pool));

    let resolver = Arc::new(RevalidateAgainstStore::new(store.clone()));
    let auth = SessionAuth::new(auth_config, store.clone(), resolver);

    let state = AccountsState { auth, store, audit };

    Router::new()
        .route("/health", get(health))
        .merge(agrisense_accounts::routes(state))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
