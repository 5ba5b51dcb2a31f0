//! SQLite store for leads, their activity log, and sector intelligence.
//!
//! The database lives at `~/.leadsignals/leadsignals.db` unless config says
//! otherwise. Derived values (signal level, temperature, SLA) are never
//! written here; they are recomputed from the activity log on every read.

use std::path::PathBuf;

use rusqlite::{params, Connection};

use crate::error::LeadError;
use crate::types::Config;
use crate::util::{format_timestamp, parse_timestamp};

mod activities;
mod audit;
mod leads;
mod sectors;
pub mod types;
pub use types::*;

pub struct LeadDb {
    conn: Connection,
}

impl LeadDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Execute a closure within a SQLite transaction.
    /// Commits on Ok, rolls back on Err.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Self) -> Result<T, DbError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(val) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(val)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    log::warn!("Rollback failed after {}: {}", e, rollback);
                }
                Err(e)
            }
        }
    }

    /// Open (or create) the database named by config: `databasePath`, or
    /// `~/.leadsignals/leadsignals.db` when unset.
    pub fn open(config: &Config) -> Result<Self, LeadError> {
        let path = crate::state::database_path(config)?;
        Ok(Self::open_at(path)?)
    }

    /// Open a database at an explicit path and apply the schema.
    pub fn open_at(path: PathBuf) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self { conn })
    }
}

/// Read a stored timestamp column. Unparseable values are reported as a
/// conversion failure on that column.
pub(crate) fn timestamp_column(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid timestamp: {raw}").into(),
        )
    })
}

pub(crate) fn optional_timestamp_column(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<chrono::DateTime<chrono::Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub(crate) fn now_column() -> String {
    format_timestamp(chrono::Utc::now())
}

#[cfg(test)]
pub(crate) fn count_rows(conn: &Connection, table: &str) -> Result<i64, DbError> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    Ok(conn.query_row(&sql, params![], |row| row.get(0))?)
}
