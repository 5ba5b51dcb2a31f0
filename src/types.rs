use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Process configuration, read from `~/.leadsignals/config.json`.
///
/// Every field has a serde default so an empty `{}` is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Explicit database location. Defaults to `~/.leadsignals/leadsignals.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub sla: SlaConfig,
    /// Identity used to attribute automated writes (cleanup passes, imports).
    #[serde(default)]
    pub system_user: SystemUserConfig,
}

/// Windows used by the commercial-signal classifier and the work queue fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalsConfig {
    #[serde(default = "default_burst_window_days")]
    pub burst_window_days: i64,
    #[serde(default = "default_burst_threshold")]
    pub burst_threshold: usize,
    /// How far back the work queue fetches SYSTEM activities per lead.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            burst_window_days: default_burst_window_days(),
            burst_threshold: default_burst_threshold(),
            lookback_days: default_lookback_days(),
        }
    }
}

fn default_burst_window_days() -> i64 {
    14
}

fn default_burst_threshold() -> usize {
    2
}

fn default_lookback_days() -> i64 {
    30
}

/// Human-touch SLA thresholds, in hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaConfig {
    #[serde(default = "default_warning_hours")]
    pub warning_hours: f64,
    #[serde(default = "default_overdue_hours")]
    pub overdue_hours: f64,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            warning_hours: default_warning_hours(),
            overdue_hours: default_overdue_hours(),
        }
    }
}

fn default_warning_hours() -> f64 {
    48.0
}

fn default_overdue_hours() -> f64 {
    120.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUserConfig {
    #[serde(default = "default_system_user_id")]
    pub id: String,
    #[serde(default = "default_system_user_name")]
    pub name: String,
}

impl Default for SystemUserConfig {
    fn default() -> Self {
        Self {
            id: default_system_user_id(),
            name: default_system_user_name(),
        }
    }
}

fn default_system_user_id() -> String {
    "system".to_string()
}

fn default_system_user_name() -> String {
    "System".to_string()
}

/// Kind of a lead activity. Only `System` entries feed signal derivation;
/// everything else counts as a human touch for SLA purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    System,
    Note,
    Call,
    Email,
    Meeting,
    Task,
}

impl ActivityKind {
    /// String label for SQL storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::System => "SYSTEM",
            ActivityKind::Note => "NOTE",
            ActivityKind::Call => "CALL",
            ActivityKind::Email => "EMAIL",
            ActivityKind::Meeting => "MEETING",
            ActivityKind::Task => "TASK",
        }
    }

    /// Parse from SQL string. Unknown kinds were entered by a person.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "SYSTEM" => ActivityKind::System,
            "CALL" => ActivityKind::Call,
            "EMAIL" => ActivityKind::Email,
            "MEETING" => ActivityKind::Meeting,
            "TASK" => ActivityKind::Task,
            _ => ActivityKind::Note,
        }
    }

    pub fn is_human(&self) -> bool {
        !matches!(self, ActivityKind::System)
    }
}

/// A single entry from a lead's activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ActivityRecord {
    pub fn is_system(&self) -> bool {
        self.kind == ActivityKind::System
    }
}
