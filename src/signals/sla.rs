//! Human-touch SLA: time since a person last worked the lead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::SlaConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlaStatus {
    Ok,
    Warning,
    Overdue,
}

impl SlaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaStatus::Ok => "OK",
            SlaStatus::Warning => "WARNING",
            SlaStatus::Overdue => "OVERDUE",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "OK" => Some(SlaStatus::Ok),
            "WARNING" => Some(SlaStatus::Warning),
            "OVERDUE" => Some(SlaStatus::Overdue),
            _ => None,
        }
    }

    /// Queue rank: most urgent sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            SlaStatus::Overdue => 0,
            SlaStatus::Warning => 1,
            SlaStatus::Ok => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanSla {
    pub status: SlaStatus,
    pub hours_elapsed: f64,
    pub label: String,
    pub reference_date: DateTime<Utc>,
}

/// Threshold hours. `hours < warning` is OK, `hours < overdue` is WARNING.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaPolicy {
    pub warning_hours: f64,
    pub overdue_hours: f64,
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self {
            warning_hours: 48.0,
            overdue_hours: 120.0,
        }
    }
}

impl From<&SlaConfig> for SlaPolicy {
    fn from(config: &SlaConfig) -> Self {
        Self {
            warning_hours: config.warning_hours,
            overdue_hours: config.overdue_hours.max(config.warning_hours),
        }
    }
}

/// SLA with the default 48h / 120h thresholds.
pub fn derive_human_sla(
    last_human_activity_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> HumanSla {
    derive_sla_with_policy(last_human_activity_at, created_at, now, &SlaPolicy::default())
}

/// Falls back to the lead's creation time when nobody has touched it yet.
/// A reference date in the future counts as zero elapsed.
pub fn derive_sla_with_policy(
    last_human_activity_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    policy: &SlaPolicy,
) -> HumanSla {
    let reference_date = last_human_activity_at.unwrap_or(created_at);
    let elapsed_ms = (now - reference_date).num_milliseconds() as f64;
    let hours_elapsed = (elapsed_ms / 3_600_000.0).max(0.0);

    let status = if hours_elapsed < policy.warning_hours {
        SlaStatus::Ok
    } else if hours_elapsed < policy.overdue_hours {
        SlaStatus::Warning
    } else {
        SlaStatus::Overdue
    };

    HumanSla {
        status,
        hours_elapsed,
        label: format_elapsed(status, hours_elapsed),
        reference_date,
    }
}

fn format_elapsed(status: SlaStatus, hours: f64) -> String {
    let days = format!("{}d", (hours / 24.0).round() as i64);
    match status {
        SlaStatus::Ok if hours < 1.0 => "< 1h".to_string(),
        SlaStatus::Ok if hours < 24.0 => format!("{}h", hours.round() as i64),
        _ => days,
    }
}
