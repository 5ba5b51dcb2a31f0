//! Sector intelligence cleanup: repair corrupted labels and merge duplicates.
//!
//! Records are grouped by the lower-cased canonical form of their sector
//! label. Each group keeps one winner (most recent `detected_at`, then most
//! recent `created_at`); empty winner fields are filled from the losers and
//! the losers are deleted. Planning is pure; `apply_sector_dedup` writes the
//! plan inside one transaction so a failure leaves the table untouched.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{
    SystemActor, ACTION_SECTOR_DELETED, ACTION_SECTOR_MERGED, ACTION_SECTOR_REPAIRED,
};
use crate::db::{DbError, DbSectorRecord, LeadDb};
use crate::hygiene::mojibake::{canonicalize, sector_key};
use crate::util::{non_empty, parse_timestamp};

const ENTITY_TYPE: &str = "sector_intelligence";

/// Fields a winner may inherit from its duplicates.
const BACKFILL_FIELDS: &[&str] = &[
    "summary",
    "sourceUrl",
    "region",
    "investmentValue",
    "detectedAt",
];

/// One group of records sharing a canonical label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupGroup {
    pub key: String,
    pub canonical: String,
    pub winner_id: String,
    pub loser_ids: Vec<String>,
    /// Backfilled field names (camelCase), in `BACKFILL_FIELDS` order.
    pub backfilled: Vec<String>,
    /// Whether the winner's own label was rewritten.
    pub label_repaired: bool,
}

/// Planned writes. `updates` holds the full post-merge winner rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupPlan {
    pub updates: Vec<DbSectorRecord>,
    pub deletions: Vec<String>,
    pub groups: Vec<DedupGroup>,
}

impl DedupPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.deletions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorCleanupReport {
    pub scanned: usize,
    pub groups_merged: usize,
    pub records_repaired: usize,
    pub records_deleted: usize,
    pub fields_backfilled: usize,
    pub dry_run: bool,
    pub groups: Vec<DedupGroup>,
}

/// `detected_at` is usually a bare date from the scanner; full timestamps
/// are accepted too. Anything else sorts as oldest.
fn parse_detected_at(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = non_empty(value)?;
    parse_timestamp(value).or_else(|| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    })
}

/// Ordering that puts the preferred winner first.
fn winner_order(a: &DbSectorRecord, b: &DbSectorRecord) -> Ordering {
    let detected_a = parse_detected_at(a.detected_at.as_deref());
    let detected_b = parse_detected_at(b.detected_at.as_deref());
    let created_a = parse_timestamp(&a.created_at);
    let created_b = parse_timestamp(&b.created_at);
    detected_b
        .cmp(&detected_a)
        .then_with(|| created_b.cmp(&created_a))
        .then_with(|| a.id.cmp(&b.id))
}

fn fill(slot: &mut Option<String>, donor: &Option<String>) -> bool {
    if non_empty(slot.as_deref()).is_some() {
        return false;
    }
    match non_empty(donor.as_deref()) {
        Some(value) => {
            *slot = Some(value.to_string());
            true
        }
        None => false,
    }
}

/// Copy empty winner fields from the donors, in donor order.
/// Returns the names of the fields that were filled.
fn backfill(winner: &mut DbSectorRecord, donors: &[&DbSectorRecord]) -> Vec<String> {
    let mut filled = [false; 5];
    for donor in donors {
        filled[0] |= fill(&mut winner.summary, &donor.summary);
        filled[1] |= fill(&mut winner.source_url, &donor.source_url);
        filled[2] |= fill(&mut winner.region, &donor.region);
        filled[3] |= fill(&mut winner.investment_value, &donor.investment_value);
        filled[4] |= fill(&mut winner.detected_at, &donor.detected_at);
    }
    BACKFILL_FIELDS
        .iter()
        .zip(filled)
        .filter(|(_, was_filled)| *was_filled)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Plan the cleanup over a snapshot of sector records.
pub fn plan_sector_dedup(records: &[DbSectorRecord]) -> DedupPlan {
    let mut grouped: BTreeMap<String, Vec<&DbSectorRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(sector_key(&record.sector))
            .or_default()
            .push(record);
    }

    let mut plan = DedupPlan::default();
    for (key, mut members) in grouped {
        members.sort_by(|a, b| winner_order(a, b));
        let Some((&first, losers)) = members.split_first() else {
            continue;
        };

        let mut winner = first.clone();
        let canonical = canonicalize(&winner.sector).canonical;
        let label_repaired = canonical != winner.sector;
        winner.sector = canonical.clone();
        let backfilled = backfill(&mut winner, losers);
        let loser_ids: Vec<String> = losers.iter().map(|r| r.id.clone()).collect();

        if !label_repaired && backfilled.is_empty() && loser_ids.is_empty() {
            continue;
        }

        if label_repaired || !backfilled.is_empty() {
            plan.updates.push(winner.clone());
        }
        plan.deletions.extend(loser_ids.iter().cloned());
        plan.groups.push(DedupGroup {
            key,
            canonical,
            winner_id: winner.id,
            loser_ids,
            backfilled,
            label_repaired,
        });
    }
    plan
}

/// Run the cleanup against the database.
///
/// With `dry_run` the plan is computed and reported but nothing is written.
/// Otherwise every update, deletion and audit row lands in one transaction.
/// A second run over the result plans nothing.
pub fn apply_sector_dedup(
    db: &LeadDb,
    actor: &SystemActor,
    dry_run: bool,
) -> Result<SectorCleanupReport, DbError> {
    let records = db.get_sector_records()?;
    let plan = plan_sector_dedup(&records);

    let report = SectorCleanupReport {
        scanned: records.len(),
        groups_merged: plan.groups.iter().filter(|g| !g.loser_ids.is_empty()).count(),
        records_repaired: plan.groups.iter().filter(|g| g.label_repaired).count(),
        records_deleted: plan.deletions.len(),
        fields_backfilled: plan.groups.iter().map(|g| g.backfilled.len()).sum(),
        dry_run,
        groups: plan.groups.clone(),
    };

    log::info!(
        "Sector cleanup: {} records scanned, {} groups merged, {} labels repaired, {} records to delete{}",
        report.scanned,
        report.groups_merged,
        report.records_repaired,
        report.records_deleted,
        if dry_run { " (dry run)" } else { "" }
    );

    if dry_run || plan.is_empty() {
        return Ok(report);
    }

    db.with_transaction(|tx| {
        for update in &plan.updates {
            tx.update_sector_record(update)?;
        }
        for id in &plan.deletions {
            tx.delete_sector_record(id)?;
        }
        for group in &plan.groups {
            let action = if group.loser_ids.is_empty() {
                ACTION_SECTOR_REPAIRED
            } else {
                ACTION_SECTOR_MERGED
            };
            let detail = serde_json::json!({
                "canonical": group.canonical,
                "deleted": group.loser_ids,
                "backfilled": group.backfilled,
                "labelRepaired": group.label_repaired,
            });
            tx.insert_audit_entry(actor, action, ENTITY_TYPE, &group.winner_id, &detail)?;
            for loser in &group.loser_ids {
                tx.insert_audit_entry(
                    actor,
                    ACTION_SECTOR_DELETED,
                    ENTITY_TYPE,
                    loser,
                    &serde_json::json!({ "mergedInto": group.winner_id }),
                )?;
            }
            log::info!(
                "Sector {:?}: kept {}, removed {:?}",
                group.canonical,
                group.winner_id,
                group.loser_ids
            );
        }
        Ok(())
    })?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    fn record(id: &str, sector: &str, detected: Option<&str>, created: &str) -> DbSectorRecord {
        DbSectorRecord {
            id: id.to_string(),
            sector: sector.to_string(),
            summary: None,
            source_url: None,
            region: None,
            investment_value: None,
            detected_at: detected.map(str::to_string),
            created_at: created.to_string(),
        }
    }

    #[test]
    fn test_clean_distinct_records_plan_nothing() {
        let records = vec![
            record("a", "Agronegócio", Some("2025-05-01"), "2025-05-01T10:00:00.000Z"),
            record("b", "Mineração", Some("2025-05-02"), "2025-05-02T10:00:00.000Z"),
        ];
        let plan = plan_sector_dedup(&records);
        assert!(plan.is_empty());
        assert!(plan.groups.is_empty());
    }

    #[test]
    fn test_most_recent_detected_wins() {
        let records = vec![
            record("old", "Indústria Farmacêutica", Some("2025-01-10"), "2025-06-01T00:00:00.000Z"),
            record("new", "IndÃºstria FarmacÃªutica", Some("2025-04-10"), "2025-04-11T00:00:00.000Z"),
        ];
        let plan = plan_sector_dedup(&records);
        assert_eq!(plan.groups.len(), 1);
        let group = &plan.groups[0];
        assert_eq!(group.winner_id, "new");
        assert_eq!(group.loser_ids, vec!["old".to_string()]);
        assert!(group.label_repaired);
        assert_eq!(plan.deletions, vec!["old".to_string()]);
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].sector, "Indústria Farmacêutica");
    }

    #[test]
    fn test_created_at_breaks_detected_tie() {
        let records = vec![
            record("first", "Energia", Some("2025-03-01"), "2025-03-01T08:00:00.000Z"),
            record("second", "energia", Some("2025-03-01"), "2025-03-02T08:00:00.000Z"),
        ];
        let plan = plan_sector_dedup(&records);
        assert_eq!(plan.groups[0].winner_id, "second");
        assert_eq!(plan.deletions, vec!["first".to_string()]);
        // Winner label already canonical and nothing to backfill.
        assert!(plan.updates.is_empty());
    }

    #[test]
    fn test_missing_detected_sorts_oldest() {
        let records = vec![
            record("undated", "Logística", None, "2025-06-01T00:00:00.000Z"),
            record("dated", "Logística", Some("2024-01-01"), "2024-01-01T00:00:00.000Z"),
        ];
        let plan = plan_sector_dedup(&records);
        assert_eq!(plan.groups[0].winner_id, "dated");
    }

    #[test]
    fn test_backfill_never_overwrites() {
        let mut winner = record("w", "Saúde", Some("2025-05-01"), "2025-05-01T00:00:00.000Z");
        winner.summary = Some("Hospital expansion".to_string());
        winner.region = Some("   ".to_string());
        let mut donor = record("d", "saúde", Some("2025-01-01"), "2025-01-01T00:00:00.000Z");
        donor.summary = Some("Older summary".to_string());
        donor.region = Some("MG".to_string());
        donor.source_url = Some("https://example.com/saude".to_string());

        let plan = plan_sector_dedup(&[winner, donor]);
        let merged = &plan.updates[0];
        assert_eq!(merged.summary.as_deref(), Some("Hospital expansion"));
        assert_eq!(merged.region.as_deref(), Some("MG"));
        assert_eq!(merged.source_url.as_deref(), Some("https://example.com/saude"));
        assert_eq!(
            plan.groups[0].backfilled,
            vec!["sourceUrl".to_string(), "region".to_string()]
        );
    }

    #[test]
    fn test_single_corrupted_record_is_repaired() {
        let records = vec![record(
            "only",
            "ConstruÃ§Ã£o Civil",
            Some("2025-02-01"),
            "2025-02-01T00:00:00.000Z",
        )];
        let plan = plan_sector_dedup(&records);
        assert!(plan.deletions.is_empty());
        assert_eq!(plan.updates[0].sector, "Construção Civil");
        assert!(plan.groups[0].label_repaired);
    }

    #[test]
    fn test_apply_writes_and_audits() {
        let db = test_db();
        let actor = SystemActor::new("system", "System");
        let mut keep = record("keep", "MineraÃ§Ã£o", Some("2025-05-01"), "2025-05-01T00:00:00.000Z");
        keep.region = None;
        let mut dup = record("drop", "Mineração", Some("2025-01-01"), "2025-01-01T00:00:00.000Z");
        dup.region = Some("PA".to_string());
        db.insert_sector_record(&keep).unwrap();
        db.insert_sector_record(&dup).unwrap();
        db.insert_sector_record(&record("other", "Varejo", None, "2025-01-01T00:00:00.000Z"))
            .unwrap();

        let report = apply_sector_dedup(&db, &actor, false).unwrap();
        assert_eq!(report.scanned, 3);
        assert_eq!(report.groups_merged, 1);
        assert_eq!(report.records_repaired, 1);
        assert_eq!(report.records_deleted, 1);
        assert_eq!(report.fields_backfilled, 1);

        let stored = db.get_sector_records().unwrap();
        let ids: Vec<&str> = stored.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["keep", "other"]);
        assert_eq!(stored[0].sector, "Mineração");
        assert_eq!(stored[0].region.as_deref(), Some("PA"));

        let audit = db.get_audit_entries(ENTITY_TYPE, "keep").unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, ACTION_SECTOR_MERGED);
        assert_eq!(audit[0].actor_id, "system");
        assert_eq!(audit[0].detail.as_ref().unwrap()["deleted"][0], "drop");

        let deleted = db.get_audit_entries(ENTITY_TYPE, "drop").unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].action, ACTION_SECTOR_DELETED);
        assert_eq!(deleted[0].detail.as_ref().unwrap()["mergedInto"], "keep");
        assert!(db.get_audit_entries(ENTITY_TYPE, "other").unwrap().is_empty());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let db = test_db();
        let actor = SystemActor::new("system", "System");
        db.insert_sector_record(&record("a", "EnergÃ\u{AD}a", Some("2025-05-01"), "2025-05-01T00:00:00.000Z"))
            .unwrap();
        db.insert_sector_record(&record("b", "energía", Some("2025-04-01"), "2025-04-01T00:00:00.000Z"))
            .unwrap();

        apply_sector_dedup(&db, &actor, false).unwrap();
        let after_first = db.get_sector_records().unwrap();

        let second = apply_sector_dedup(&db, &actor, false).unwrap();
        assert_eq!(second.records_deleted, 0);
        assert_eq!(second.records_repaired, 0);
        assert!(second.groups.is_empty());
        assert_eq!(db.get_sector_records().unwrap(), after_first);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let db = test_db();
        let actor = SystemActor::new("system", "System");
        db.insert_sector_record(&record("a", "Têxtil", Some("2025-05-01"), "2025-05-01T00:00:00.000Z"))
            .unwrap();
        db.insert_sector_record(&record("b", "TÃªxtil", Some("2025-04-01"), "2025-04-01T00:00:00.000Z"))
            .unwrap();

        let report = apply_sector_dedup(&db, &actor, true).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.records_deleted, 1);
        assert_eq!(db.get_sector_records().unwrap().len(), 2);
        assert!(db.get_audit_entries(ENTITY_TYPE, "a").unwrap().is_empty());
    }
}
