//! Postgres-backed user store
//!
//! Uses runtime `sqlx::query_as` (not macros) so the crate builds
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use agrisense_auth::{NewUser, Role, UserRecord, UserStore};
use agrisense_common::{Error, Result};

use crate::repository::parse_enum;

/// Row type for user lookup (includes password_hash for verification)
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: Option<String>,
    organization: Option<String>,
    password_hash: String,
    role: String,
    plan: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> Result<UserRecord> {
        Ok(UserRecord {
            id: self.id.to_string(),
            email: self.email,
            name: self.name,
            organization: self.organization,
            password_hash: self.password_hash,
            role: parse_enum(&self.role, "role")?,
            plan: parse_enum(&self.plan, "plan")?,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, name, organization, password_hash, \
                            role, plan, avatar_url, created_at, updated_at";

/// Postgres implementation of `UserStore`
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        // Non-UUID subjects cannot match any row
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(UserRow::into_record).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_record).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (email, name, organization, password_hash, role, plan, avatar_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email.to_lowercase())
        .bind(&user.name)
        .bind(&user.organization)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.plan.as_str())
        .bind(&user.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false)
            {
                Error::Conflict("email already registered".to_string())
            } else {
                Error::Database(e)
            }
        })?;

        row.into_record()
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<Option<UserRecord>> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_record).transpose()
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<()> {
        let id = Uuid::parse_str(id)
            .map_err(|_| Error::NotFound(format!("user {id}")))?;

        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("user {id}")));
        }
        Ok(())
    }
}
