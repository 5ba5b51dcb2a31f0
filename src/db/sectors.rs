use super::*;

impl LeadDb {
    // =========================================================================
    // Sector intelligence
    // =========================================================================

    pub fn insert_sector_record(&self, record: &DbSectorRecord) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO sector_intelligence (
                id, sector, summary, source_url, region, investment_value,
                detected_at, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.sector,
                record.summary,
                record.source_url,
                record.region,
                record.investment_value,
                record.detected_at,
                record.created_at,
                now_column(),
            ],
        )?;
        Ok(())
    }

    /// All sector records, in insertion-independent id order.
    pub fn get_sector_records(&self) -> Result<Vec<DbSectorRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sector, summary, source_url, region, investment_value,
                    detected_at, created_at
             FROM sector_intelligence ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DbSectorRecord {
                id: row.get(0)?,
                sector: row.get(1)?,
                summary: row.get(2)?,
                source_url: row.get(3)?,
                region: row.get(4)?,
                investment_value: row.get(5)?,
                detected_at: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Overwrite the mutable columns of an existing record.
    pub fn update_sector_record(&self, record: &DbSectorRecord) -> Result<(), DbError> {
        let changed = self.conn.execute(
            "UPDATE sector_intelligence SET
                sector = ?2, summary = ?3, source_url = ?4, region = ?5,
                investment_value = ?6, detected_at = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                record.id,
                record.sector,
                record.summary,
                record.source_url,
                record.region,
                record.investment_value,
                record.detected_at,
                now_column(),
            ],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound {
                entity: "sector_intelligence",
                id: record.id.clone(),
            });
        }
        Ok(())
    }

    pub fn delete_sector_record(&self, id: &str) -> Result<(), DbError> {
        let changed = self
            .conn
            .execute("DELETE FROM sector_intelligence WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DbError::NotFound {
                entity: "sector_intelligence",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
