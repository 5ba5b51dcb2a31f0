use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Failed to encode audit detail: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A row from the `leads` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbLead {
    pub id: String,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub stage: String,
    pub created_at: String,
    pub updated_at: String,
    pub archived: bool,
}

/// A row from the `sector_intelligence` table.
///
/// Optional text columns are the ones the dedup pass may backfill from
/// older duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSectorRecord {
    pub id: String,
    pub sector: String,
    pub summary: Option<String>,
    pub source_url: Option<String>,
    pub region: Option<String>,
    pub investment_value: Option<String>,
    pub detected_at: Option<String>,
    pub created_at: String,
}
