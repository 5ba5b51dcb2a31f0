use super::*;

impl LeadDb {
    // =========================================================================
    // Leads
    // =========================================================================

    /// Insert or update a lead.
    pub fn upsert_lead(&self, lead: &DbLead) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO leads (id, company_name, contact_name, stage, created_at, updated_at, archived)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                company_name = excluded.company_name,
                contact_name = excluded.contact_name,
                stage = excluded.stage,
                updated_at = excluded.updated_at,
                archived = excluded.archived",
            params![
                lead.id,
                lead.company_name,
                lead.contact_name,
                lead.stage,
                lead.created_at,
                lead.updated_at,
                lead.archived as i32,
            ],
        )?;
        Ok(())
    }

    /// Get a lead by ID.
    pub fn get_lead(&self, id: &str) -> Result<Option<DbLead>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, company_name, contact_name, stage, created_at, updated_at, archived
             FROM leads WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], Self::map_lead_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Get all non-archived leads, ordered by company name.
    pub fn get_active_leads(&self) -> Result<Vec<DbLead>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, company_name, contact_name, stage, created_at, updated_at, archived
             FROM leads WHERE archived = 0 ORDER BY company_name, id",
        )?;
        let rows = stmt.query_map([], Self::map_lead_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn map_lead_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbLead> {
        Ok(DbLead {
            id: row.get(0)?,
            company_name: row.get(1)?,
            contact_name: row.get(2)?,
            stage: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            archived: row.get::<_, i32>(6)? != 0,
        })
    }
}
