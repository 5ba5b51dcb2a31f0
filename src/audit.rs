//! Attribution for automated writes.
//!
//! Every write path that is not driven by a person takes a `SystemActor`
//! explicitly. The actor is resolved once from config at process start and
//! handed down; nothing looks it up on its own.

use serde::{Deserialize, Serialize};

use crate::types::SystemUserConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemActor {
    pub id: String,
    pub name: String,
}

impl SystemActor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn from_config(config: &SystemUserConfig) -> Self {
        Self::new(config.id.trim(), config.name.trim())
    }
}

/// Audit actions written by this crate.
pub const ACTION_SECTOR_MERGED: &str = "sector.merged";
pub const ACTION_SECTOR_REPAIRED: &str = "sector.repaired";
pub const ACTION_SECTOR_DELETED: &str = "sector.deleted";
pub const ACTION_SYSTEM_NOTE: &str = "activity.system_note";

/// A row from the `audit_log` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub actor_id: String,
    pub actor_name: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub detail: Option<serde_json::Value>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_from_config_trims() {
        let config = SystemUserConfig {
            id: " importer ".to_string(),
            name: "Importer Bot ".to_string(),
        };
        assert_eq!(
            SystemActor::from_config(&config),
            SystemActor::new("importer", "Importer Bot")
        );
    }

    #[test]
    fn test_default_actor() {
        let actor = SystemActor::from_config(&SystemUserConfig::default());
        assert_eq!(actor.id, "system");
        assert_eq!(actor.name, "System");
    }
}
