//! Commercial-signal derivation for leads.
//!
//! A lead's SYSTEM activity notes carry machine-written metadata. The
//! pipeline parses that metadata, classifies the lead's commercial intent,
//! maps it to a display temperature, and measures how long the lead has
//! waited for a human touch. All of it is pure and recomputed on read.

pub mod commercial;
pub mod insight;
pub mod queue;
pub mod sla;
pub mod system_note;
pub mod temperature;

pub use commercial::{classify_commercial_signal, CommercialSignal, SignalLevel};
pub use insight::{derive_lead_insight, LeadInsight};
pub use sla::{derive_human_sla, HumanSla, SlaStatus};
pub use system_note::{parse_system_note, sanitize_source_url, ParsedSystemMeta};
pub use temperature::{temperature_for, Temperature};
