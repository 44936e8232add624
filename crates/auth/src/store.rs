//! User-store abstraction consumed by guards and bootstrap
//!
//! Guards never own persistent state; they read through this trait.
//! The Postgres-backed implementation lives in the accounts domain;
//! `MemoryUserStore` serves tests and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use agrisense_common::{Error, Result};

use crate::types::{Plan, Role};

/// Durable user row as owned by the store.
///
/// This is the only type in the auth layer that carries the password
/// hash; it never crosses the guard boundary unsanitized.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    /// Stored lowercased
    pub email: String,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub plan: Plan,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub plan: Plan,
    pub avatar_url: Option<String>,
}

/// Store interface for the durable user entity, keyed by subject.
///
/// Each guard call performs at most one read through this trait; writes
/// happen only in bootstrap and the role-management handler.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>>;

    /// Lookup by email, case-insensitive
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Create a user; fails with `Error::Conflict` when the email is taken
    async fn create(&self, user: NewUser) -> Result<UserRecord>;

    /// Returns the updated record, or `None` when the user vanished
    async fn update_role(&self, id: &str, role: Role) -> Result<Option<UserRecord>>;

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<()>;
}

/// In-memory `UserStore` for tests and local development.
///
/// Tracks a write counter so tests can assert that idempotent paths
/// (bootstrap re-runs in particular) perform zero writes.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
    writes: AtomicUsize,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating operations performed so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock_poisoned() -> Error {
        Error::Internal("user store lock poisoned".to_string())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().map_err(|_| Self::lock_poisoned())?;
        Ok(users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let needle = email.to_lowercase();
        let users = self.users.read().map_err(|_| Self::lock_poisoned())?;
        Ok(users.values().find(|u| u.email == needle).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let email = user.email.to_lowercase();
        let mut users = self.users.write().map_err(|_| Self::lock_poisoned())?;

        if users.values().any(|u| u.email == email) {
            return Err(Error::Conflict("email already registered".to_string()));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            name: user.name,
            organization: user.organization,
            password_hash: user.password_hash,
            role: user.role,
            plan: user.plan,
            avatar_url: user.avatar_url,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<Option<UserRecord>> {
        let mut users = self.users.write().map_err(|_| Self::lock_poisoned())?;
        let Some(record) = users.get_mut(id) else {
            return Ok(None);
        };
        record.role = role;
        record.updated_at = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(record.clone()))
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<()> {
        let mut users = self.users.write().map_err(|_| Self::lock_poisoned())?;
        let Some(record) = users.get_mut(id) else {
            return Err(Error::NotFound(format!("user {id}")));
        };
        record.password_hash = password_hash.to_string();
        record.updated_at = Utc::now();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
