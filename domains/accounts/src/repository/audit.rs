//! Postgres-backed admin audit log

use async_trait::async_trait;
use sqlx::PgPool;

use agrisense_common::Result;

use crate::audit::{AuditEntry, AuditLog};

/// Postgres implementation of `AuditLog`
#[derive(Clone)]
pub struct PgAuditLog {
    pool: PgPool,
}

impl PgAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PgAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_logs
                (actor_id, actor_email, actor_name,
                 action, target_id, target_email, target_name, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&entry.actor.id)
        .bind(&entry.actor.email)
        .bind(&entry.actor.name)
        .bind(&entry.action)
        .bind(&entry.target.id)
        .bind(&entry.target.email)
        .bind(&entry.target.name)
        .bind(&entry.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
