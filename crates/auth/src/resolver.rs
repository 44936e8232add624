//! Identity-resolution strategy behind the role guard
//!
//! Selected once at construction so guard logic carries no deployment-mode
//! branching: remote-backend deployments trust token claims, local
//! deployments always re-validate against the store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::claims::SessionPayload;
use crate::error::AuthError;
use crate::store::UserStore;
use crate::types::AuthIdentity;

/// Turns verified session claims into the identity a guard hands to its
/// caller.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, claims: &SessionPayload) -> Result<AuthIdentity, AuthError>;
}

/// Accepts the token's embedded claims as current.
///
/// Used when a separate backend owns user data and a per-request re-fetch
/// would cost a network round trip. Staleness is bounded by token
/// lifetime; callers choosing this strategy accept that tradeoff.
pub struct TrustTokenClaims;

#[async_trait]
impl IdentityResolver for TrustTokenClaims {
    async fn resolve(&self, claims: &SessionPayload) -> Result<AuthIdentity, AuthError> {
        Ok(AuthIdentity::from(claims))
    }
}

/// Re-fetches the live user record on every call.
///
/// A missing record means the account was deleted after token issuance,
/// which invalidates the still-signed token. Role changes made after
/// issuance take effect immediately because the live record wins over
/// the token's copy.
pub struct RevalidateAgainstStore {
    store: Arc<dyn UserStore>,
}

impl RevalidateAgainstStore {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityResolver for RevalidateAgainstStore {
    async fn resolve(&self, claims: &SessionPayload) -> Result<AuthIdentity, AuthError> {
        let record = self.store.find_by_id(&claims.sub).await.map_err(|e| {
            tracing::error!(error = %e, sub = %claims.sub, "failed to load user during re-validation");
            AuthError::UserLoadError
        })?;

        match record {
            Some(record) => Ok(AuthIdentity::from(&record)),
            None => Err(AuthError::SessionExpired),
        }
    }
}
