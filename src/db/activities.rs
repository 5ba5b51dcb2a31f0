use chrono::{DateTime, Utc};

use super::*;
use crate::audit::{SystemActor, ACTION_SYSTEM_NOTE};
use crate::signals::system_note::{render_system_note, SystemNoteInput};
use crate::types::{ActivityKind, ActivityRecord};

const ACTIVITY_COLUMNS: &str = "id, type, title, notes, created_at, completed_at";

impl LeadDb {
    // =========================================================================
    // Activities
    // =========================================================================

    /// Insert an activity for a lead. `created_by` is the person or system
    /// actor responsible for the entry.
    pub fn insert_activity(
        &self,
        lead_id: &str,
        activity: &ActivityRecord,
        created_by: Option<&str>,
    ) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO activities (id, lead_id, type, title, notes, created_at, completed_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                activity.id,
                lead_id,
                activity.kind.as_str(),
                activity.title,
                activity.notes,
                format_timestamp(activity.created_at),
                activity.completed_at.map(format_timestamp),
                created_by,
            ],
        )?;
        Ok(())
    }

    /// Write a SYSTEM note in the meta-block wire format, attributed to the
    /// injected system actor.
    pub fn record_system_note(
        &self,
        lead_id: &str,
        title: &str,
        input: &SystemNoteInput,
        actor: &SystemActor,
        created_at: DateTime<Utc>,
    ) -> Result<ActivityRecord, DbError> {
        if self.get_lead(lead_id)?.is_none() {
            return Err(DbError::NotFound {
                entity: "lead",
                id: lead_id.to_string(),
            });
        }

        let record = ActivityRecord {
            id: uuid::Uuid::new_v4().to_string(),
            kind: ActivityKind::System,
            title: title.to_string(),
            notes: Some(render_system_note(input)),
            created_at,
            completed_at: None,
        };

        self.with_transaction(|db| {
            db.insert_activity(lead_id, &record, Some(&actor.id))?;
            db.insert_audit_entry(
                actor,
                ACTION_SYSTEM_NOTE,
                "activity",
                &record.id,
                &serde_json::json!({ "leadId": lead_id, "title": title }),
            )?;
            Ok(())
        })?;

        Ok(record)
    }

    /// All activities for a lead, newest first.
    pub fn get_activities(&self, lead_id: &str) -> Result<Vec<ActivityRecord>, DbError> {
        let sql = format!(
            "SELECT {} FROM activities WHERE lead_id = ?1 ORDER BY created_at DESC",
            ACTIVITY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![lead_id], Self::map_activity_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// SYSTEM activities created at or after `since`, newest first.
    ///
    /// SQL narrows by the leading `YYYY-MM-DD` of `created_at`, which both the
    /// RFC3339 and the SQLite formats share, with a day of slack for offsets.
    /// The exact cutoff is applied on the parsed value. Rows with an
    /// unreadable timestamp are skipped with a warning rather than failing
    /// the whole lead.
    pub fn get_system_activities_since(
        &self,
        lead_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>, DbError> {
        let day_floor = since
            .checked_sub_signed(chrono::Duration::days(1))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
            .format("%Y-%m-%d")
            .to_string();
        let sql = format!(
            "SELECT {} FROM activities
             WHERE lead_id = ?1 AND type = ?2 AND substr(created_at, 1, 10) >= ?3
             ORDER BY created_at DESC",
            ACTIVITY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![lead_id, ActivityKind::System.as_str(), day_floor],
            Self::map_activity_row,
        )?;

        let mut out = Vec::new();
        for row in rows {
            match row {
                Ok(activity) if activity.created_at >= since => out.push(activity),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable activity for lead {}: {}", lead_id, e),
            }
        }
        Ok(out)
    }

    /// Most recent human-originated activity (anything but SYSTEM).
    pub fn get_last_human_activity_at(
        &self,
        lead_id: &str,
    ) -> Result<Option<DateTime<Utc>>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT created_at FROM activities WHERE lead_id = ?1 AND type != ?2")?;
        let rows = stmt.query_map(params![lead_id, ActivityKind::System.as_str()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut latest: Option<DateTime<Utc>> = None;
        for raw in rows {
            let raw = raw?;
            match parse_timestamp(&raw) {
                Some(ts) => latest = latest.max(Some(ts)),
                None => log::warn!("Ignoring unreadable timestamp {:?} for lead {}", raw, lead_id),
            }
        }
        Ok(latest)
    }

    fn map_activity_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRecord> {
        Ok(ActivityRecord {
            id: row.get(0)?,
            kind: ActivityKind::from_str_lossy(&row.get::<_, String>(1)?),
            title: row.get(2)?,
            notes: row.get(3)?,
            created_at: timestamp_column(row, 4)?,
            completed_at: optional_timestamp_column(row, 5)?,
        })
    }
}
