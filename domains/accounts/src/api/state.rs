//! Accounts domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;

use agrisense_auth::{SessionAuth, UserStore};

use crate::audit::AuditLog;

/// Application state for the accounts domain
#[derive(Clone)]
pub struct AccountsState {
    pub auth: SessionAuth,
    pub store: Arc<dyn UserStore>,
    pub audit: Arc<dyn AuditLog>,
}

impl FromRef<AccountsState> for SessionAuth {
    fn from_ref(state: &AccountsState) -> Self {
        state.auth.clone()
    }
}
