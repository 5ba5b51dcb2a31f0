//! Data hygiene for ingested sector intelligence.
//!
//! `mojibake` repairs encoding-corrupted labels; `sector_dedup` uses the
//! repaired labels as grouping keys to merge duplicate records.

pub mod mojibake;
pub mod sector_dedup;

pub use mojibake::{canonicalize, sector_key, Canonicalized};
pub use sector_dedup::{apply_sector_dedup, plan_sector_dedup, DedupPlan, SectorCleanupReport};
