//! Root-admin bootstrap
//!
//! Idempotent startup routine guaranteeing the distinguished admin
//! account exists with the configured credentials and the `admin` role.
//! Run at process start and again before login attempts; it writes only
//! what actually drifted.

use agrisense_common::{hash_password, verify_password, Error, Result};

use crate::config::RootAdminConfig;
use crate::store::{NewUser, UserRecord, UserStore};
use crate::types::{Plan, Role};

/// Ensure the root-admin account exists, holds the `admin` role, and its
/// password hash verifies against the configured default.
///
/// The role and password checks are independent; each is healed without
/// touching the other, and an unchanged account produces zero writes.
pub async fn ensure_root_admin(
    store: &dyn UserStore,
    config: &RootAdminConfig,
) -> Result<UserRecord> {
    let Some(mut record) = store.find_by_email(&config.email).await? else {
        let record = store
            .create(NewUser {
                email: config.email.clone(),
                name: Some(config.name.clone()),
                organization: Some(config.organization.clone()),
                password_hash: hash_password(&config.password),
                role: Role::Admin,
                plan: Plan::Enterprise,
                avatar_url: None,
            })
            .await?;
        tracing::info!(email = %config.email, "root admin account created");
        return Ok(record);
    };

    if record.role != Role::Admin {
        record = store
            .update_role(&record.id, Role::Admin)
            .await?
            .ok_or_else(|| Error::Internal("root admin vanished during bootstrap".to_string()))?;
        tracing::info!(email = %config.email, "root admin role restored");
    }

    if !verify_password(&config.password, &record.password_hash) {
        let password_hash = hash_password(&config.password);
        store
            .update_password_hash(&record.id, &password_hash)
            .await?;
        record.password_hash = password_hash;
        tracing::info!(email = %config.email, "root admin password reset to configured default");
    }

    Ok(record)
}
