//! Postgres-backed repositories for the accounts domain

mod audit;
mod users;

pub use audit::PgAuditLog;
pub use users::PgUserStore;

use agrisense_common::{Error, Result};

/// Parse a TEXT enum column, failing loudly on corrupt values
fn parse_enum<T: std::str::FromStr>(raw: &str, column: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::Internal(format!("corrupt {column} value in users table: {raw}")))
}

/// Embedded migrations for the accounts schema
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
