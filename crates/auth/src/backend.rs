//! Concrete session-auth backend
//!
//! Wraps the token codec, the identity-resolution strategy, and the user
//! store. Domain states expose this via `FromRef`:
//! ```ignore
//! impl FromRef<MyDomainState> for SessionAuth {
//!     fn from_ref(state: &MyDomainState) -> Self {
//!         state.auth.clone()
//!     }
//! }
//! ```

use std::sync::Arc;

use axum::http::HeaderMap;
use cookie::Cookie;

use crate::claims::SessionPayload;
use crate::codec::SessionCodec;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::resolver::IdentityResolver;
use crate::session;
use crate::store::UserStore;
use crate::types::{AuthIdentity, Role};

/// Default allow-list for the elevated-role guard
pub const ELEVATED_ROLES: &[Role] = &[Role::Expert, Role::Admin];

/// Session authentication backend shared across handlers.
#[derive(Clone)]
pub struct SessionAuth {
    config: AuthConfig,
    codec: SessionCodec,
    resolver: Arc<dyn IdentityResolver>,
    store: Arc<dyn UserStore>,
}

impl SessionAuth {
    /// Assemble the backend. The resolver decides whether role-guarded
    /// calls trust token claims or re-validate against `store`; the
    /// admin guard always re-validates regardless.
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn UserStore>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        let codec = SessionCodec::new(config.session_secret.clone(), config.max_age_seconds);
        Self {
            config,
            codec,
            resolver,
            store,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// Recover the verified session payload from request headers, if any.
    pub fn session(&self, headers: &HeaderMap) -> Option<SessionPayload> {
        session::session_from_headers(headers, &self.codec, &self.config.cookie_name)
    }

    /// Resolve claims into an identity using the configured strategy.
    pub async fn resolve(&self, claims: &SessionPayload) -> Result<AuthIdentity, AuthError> {
        self.resolver.resolve(claims).await
    }

    /// Authorize access restricted to the roles in `allowed`.
    ///
    /// Identity comes from the configured resolution strategy, so in
    /// local deployments the live record's role is what gets checked.
    pub async fn require_elevated(
        &self,
        headers: &HeaderMap,
        allowed: &[Role],
    ) -> Result<AuthIdentity, AuthError> {
        let claims = self.session(headers).ok_or(AuthError::Unauthorized)?;
        let identity = self.resolver.resolve(&claims).await?;

        if !allowed.contains(&identity.role) {
            return Err(AuthError::PermissionDenied);
        }

        Ok(identity)
    }

    /// Authorize access restricted exclusively to admins.
    ///
    /// Always re-fetches the live record; admin actions are too sensitive
    /// to trust token-embedded claims in any deployment mode.
    pub async fn require_admin(&self, headers: &HeaderMap) -> Result<AuthIdentity, AuthError> {
        let claims = self.session(headers).ok_or(AuthError::MissingSession)?;

        let record = self.store.find_by_id(&claims.sub).await.map_err(|e| {
            tracing::error!(error = %e, sub = %claims.sub, "failed to load user during admin check");
            AuthError::UserLoadError
        })?;

        match record {
            Some(record) if record.role.is_admin() => Ok(AuthIdentity::from(&record)),
            _ => Err(AuthError::AdminRequired),
        }
    }

    /// Build the session cookie for a freshly signed token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        session::session_cookie(
            &self.config.cookie_name,
            token,
            self.config.secure_cookies,
            self.config.max_age_seconds,
        )
    }

    /// Build the cookie that clears the session.
    pub fn expired_session_cookie(&self) -> Cookie<'static> {
        session::expired_session_cookie(&self.config.cookie_name, self.config.secure_cookies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{RevalidateAgainstStore, TrustTokenClaims};
    use crate::store::{MemoryUserStore, NewUser};
    use crate::types::Plan;
    use axum::http::HeaderValue;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: None,
            organization: None,
            password_hash: "salt:hash".to_string(),
            role,
            plan: Plan::Free,
            avatar_url: None,
        }
    }

    fn local_auth(store: Arc<MemoryUserStore>) -> SessionAuth {
        SessionAuth::new(
            AuthConfig::for_tests("backend-secret"),
            store.clone(),
            Arc::new(RevalidateAgainstStore::new(store)),
        )
    }

    fn remote_auth(store: Arc<MemoryUserStore>) -> SessionAuth {
        SessionAuth::new(
            AuthConfig::for_tests("backend-secret"),
            store,
            Arc::new(TrustTokenClaims),
        )
    }

    fn bearer_headers(auth: &SessionAuth, sub: &str, role: Role) -> HeaderMap {
        let token = auth
            .codec()
            .sign(&SessionPayload::new(sub, "user@example.com", role))
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_elevated_requires_session() {
        let auth = local_auth(Arc::new(MemoryUserStore::new()));
        let err = auth
            .require_elevated(&HeaderMap::new(), ELEVATED_ROLES)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unauthorized);
    }

    #[tokio::test]
    async fn test_elevated_allow_list_per_role() {
        let store = Arc::new(MemoryUserStore::new());
        let auth = local_auth(store.clone());

        for (role, expected_ok) in [
            (Role::Farmer, false),
            (Role::Expert, true),
            (Role::Admin, true),
        ] {
            let user = store
                .create(new_user(&format!("{role}@example.com"), role))
                .await
                .unwrap();
            let headers = bearer_headers(&auth, &user.id, role);
            let result = auth.require_elevated(&headers, ELEVATED_ROLES).await;
            if expected_ok {
                assert_eq!(result.unwrap().role, role);
            } else {
                assert_eq!(result.unwrap_err(), AuthError::PermissionDenied);
            }
        }
    }

    #[tokio::test]
    async fn test_elevated_custom_allow_list() {
        let store = Arc::new(MemoryUserStore::new());
        let auth = local_auth(store.clone());
        let expert = store
            .create(new_user("expert@example.com", Role::Expert))
            .await
            .unwrap();

        let headers = bearer_headers(&auth, &expert.id, Role::Expert);
        let err = auth
            .require_elevated(&headers, &[Role::Admin])
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::PermissionDenied);
    }

    #[tokio::test]
    async fn test_elevated_local_mode_deleted_user_is_expired() {
        let auth = local_auth(Arc::new(MemoryUserStore::new()));
        let headers = bearer_headers(&auth, "deleted-user", Role::Admin);
        let err = auth
            .require_elevated(&headers, ELEVATED_ROLES)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::SessionExpired);
    }

    #[tokio::test]
    async fn test_elevated_remote_mode_trusts_claims() {
        // Store is empty; the token role alone decides
        let auth = remote_auth(Arc::new(MemoryUserStore::new()));

        let headers = bearer_headers(&auth, "remote-user", Role::Expert);
        let identity = auth.require_elevated(&headers, ELEVATED_ROLES).await.unwrap();
        assert_eq!(identity.id, "remote-user");

        let headers = bearer_headers(&auth, "remote-user", Role::Farmer);
        let err = auth
            .require_elevated(&headers, ELEVATED_ROLES)
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::PermissionDenied);
    }

    #[tokio::test]
    async fn test_admin_guard_refetches_live_role() {
        let store = Arc::new(MemoryUserStore::new());
        let auth = local_auth(store.clone());
        let user = store
            .create(new_user("promoted@example.com", Role::Farmer))
            .await
            .unwrap();

        // Token was minted while the user was still a farmer
        let headers = bearer_headers(&auth, &user.id, Role::Farmer);
        let err = auth.require_admin(&headers).await.unwrap_err();
        assert_eq!(err, AuthError::AdminRequired);

        // Promotion in the store takes effect without reissuing the token
        store.update_role(&user.id, Role::Admin).await.unwrap();
        let identity = auth.require_admin(&headers).await.unwrap();
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_admin_guard_never_trusts_claims() {
        // Even with the trusting resolver, an admin-role token for an
        // unknown subject must not pass the admin guard.
        let auth = remote_auth(Arc::new(MemoryUserStore::new()));
        let headers = bearer_headers(&auth, "forged-admin", Role::Admin);
        let err = auth.require_admin(&headers).await.unwrap_err();
        assert_eq!(err, AuthError::AdminRequired);
    }

    #[tokio::test]
    async fn test_admin_guard_missing_session() {
        let auth = local_auth(Arc::new(MemoryUserStore::new()));
        let err = auth.require_admin(&HeaderMap::new()).await.unwrap_err();
        assert_eq!(err, AuthError::MissingSession);
    }
}
