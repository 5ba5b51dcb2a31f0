use super::*;
use crate::audit::{AuditEntry, SystemActor};

impl LeadDb {
    // =========================================================================
    // Audit log
    // =========================================================================

    /// Append an audit row. `detail` is stored as JSON text.
    pub fn insert_audit_entry(
        &self,
        actor: &SystemActor,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        detail: &serde_json::Value,
    ) -> Result<i64, DbError> {
        let detail_json = serde_json::to_string(detail)?;
        self.conn.execute(
            "INSERT INTO audit_log (actor_id, actor_name, action, entity_type, entity_id, detail, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                actor.id,
                actor.name,
                action,
                entity_type,
                entity_id,
                detail_json,
                now_column(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Audit rows for one entity, oldest first.
    pub fn get_audit_entries(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, actor_id, actor_name, action, entity_type, entity_id, detail, created_at
             FROM audit_log
             WHERE entity_type = ?1 AND entity_id = ?2
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![entity_type, entity_id], |row| {
            let detail: Option<String> = row.get(6)?;
            Ok(AuditEntry {
                id: row.get(0)?,
                actor_id: row.get(1)?,
                actor_name: row.get(2)?,
                action: row.get(3)?,
                entity_type: row.get(4)?,
                entity_id: row.get(5)?,
                detail: detail.and_then(|d| serde_json::from_str(&d).ok()),
                created_at: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
