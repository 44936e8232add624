//! Admin audit log
//!
//! Role promotions and demotions are recorded with the acting admin,
//! the target account, and the before/after roles.

use std::sync::RwLock;

use async_trait::async_trait;
use serde::Serialize;

use agrisense_common::{Error, Result};

/// The admin performing the recorded action
#[derive(Debug, Clone, Serialize)]
pub struct AuditActor {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The account the action was applied to
#[derive(Debug, Clone, Serialize)]
pub struct AuditTarget {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One audit record
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub actor: AuditActor,
    /// `role.promote`, `role.demote`, or `role.update`
    pub action: String,
    pub target: AuditTarget,
    pub metadata: serde_json::Value,
}

/// Sink for admin audit records
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<()>;
}

/// In-memory audit log for tests
#[derive(Default)]
pub struct MemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| Error::Internal("audit log lock poisoned".to_string()))?
            .push(entry);
        Ok(())
    }
}
