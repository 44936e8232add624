//! Authentication configuration
//!
//! Read once at process start from environment variables, following the
//! same 12-factor conventions as `agrisense_common::Config`.

use std::env;

use agrisense_common::Environment;

use crate::types::Role;

/// Default session cookie name
pub const DEFAULT_COOKIE_NAME: &str = "agrisense-session";

/// Lower bound applied to a configured session TTL
pub const MIN_SESSION_TTL_SECONDS: u64 = 300;

/// Development-only signing secret; production deployments must override
const DEV_SESSION_SECRET: &str = "agrisense-dev-secret";

/// Defaults for the distinguished root-admin account
#[derive(Debug, Clone)]
pub struct RootAdminConfig {
    /// Canonicalized (lowercased) at load time
    pub email: String,
    pub password: String,
    pub name: String,
    pub organization: String,
}

impl RootAdminConfig {
    /// Whether `email` names the protected root-admin account
    pub fn is_protected(&self, email: &str) -> bool {
        email.eq_ignore_ascii_case(&self.email)
    }

    /// Whether assigning `next` to the account with `email` would demote
    /// the root admin. Such a change must be rejected unconditionally.
    pub fn forbids_role_change(&self, email: &str, next: Role) -> bool {
        self.is_protected(email) && next != Role::Admin
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_secret: String,
    pub cookie_name: String,
    /// Session TTL; `None` means session cookies with no expiry attribute
    /// and no age check in `verify`
    pub max_age_seconds: Option<u64>,
    /// Set the `Secure` attribute on session cookies
    pub secure_cookies: bool,
    pub root_admin: RootAdminConfig,
}

impl AuthConfig {
    /// Load configuration from environment variables.
    pub fn from_env(environment: Environment) -> Self {
        dotenvy::dotenv().ok();

        let session_secret = env::var("AUTH_SESSION_SECRET").unwrap_or_else(|_| {
            tracing::warn!("AUTH_SESSION_SECRET not set; using insecure development secret");
            DEV_SESSION_SECRET.to_string()
        });

        let cookie_name =
            env::var("AUTH_SESSION_COOKIE").unwrap_or_else(|_| DEFAULT_COOKIE_NAME.to_string());

        let max_age_seconds = env::var("AUTH_SESSION_TTL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(|ttl| {
                if ttl <= 0 {
                    None
                } else {
                    Some((ttl as u64).max(MIN_SESSION_TTL_SECONDS))
                }
            });

        let root_admin = RootAdminConfig {
            email: env::var("ROOT_ADMIN_EMAIL")
                .unwrap_or_else(|_| "agrisenadmin@agrisen.com".to_string())
                .to_lowercase(),
            password: env::var("ROOT_ADMIN_PASSWORD")
                .unwrap_or_else(|_| "AgrisenAdmin1".to_string()),
            name: env::var("ROOT_ADMIN_NAME").unwrap_or_else(|_| "Agrisen Admin".to_string()),
            organization: env::var("ROOT_ADMIN_ORG").unwrap_or_else(|_| "Agrisen HQ".to_string()),
        };

        Self {
            session_secret,
            cookie_name,
            max_age_seconds,
            secure_cookies: environment.is_production(),
            root_admin,
        }
    }

    /// Fixed configuration for tests and embedded use.
    pub fn for_tests(secret: impl Into<String>) -> Self {
        Self {
            session_secret: secret.into(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            max_age_seconds: None,
            secure_cookies: false,
            root_admin: RootAdminConfig {
                email: "root@agrisense.test".to_string(),
                password: "RootPassword1".to_string(),
                name: "Root Admin".to_string(),
                organization: "AgriSense".to_string(),
            },
        }
    }
}
