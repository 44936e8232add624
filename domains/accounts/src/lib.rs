//! Accounts domain: durable user store, auth routes, admin role
//! management, and the admin audit log.

pub mod api;
pub mod audit;
pub mod repository;

pub use api::{routes, AccountsState};
pub use audit::{AuditActor, AuditEntry, AuditLog, AuditTarget, MemoryAuditLog};
pub use repository::{PgAuditLog, PgUserStore, MIGRATOR};

// Re-export auth types for convenience
pub use agrisense_auth::{
    AdminUser, AuthConfig, AuthError, AuthIdentity, ElevatedUser, Role, SessionAuth,
    SessionClaims, UserStore,
};
