//! Commercial signal classification from a lead's SYSTEM activity log.
//!
//! Evaluation is tiered top-down. HIGH comes from buying-intent categories
//! or a HIGH-confidence note; MEDIUM from softer categories or a burst of
//! recent SYSTEM activity; LOW otherwise. Once HIGH is reached the MEDIUM
//! rules are skipped, so reasons never mix tiers. Category and confidence
//! checks ignore age; the burst window is the only time-bounded rule.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::system_note::{
    parse_system_note, sanitize_source_url, ParsedSystemMeta, CATEGORY_CLEVEL, CATEGORY_C_LEVEL,
    CATEGORY_ERP_REPLACEMENT, CATEGORY_EXPANSION, CATEGORY_RFP, CATEGORY_SECTOR, CONFIDENCE_HIGH,
};
use crate::types::{ActivityRecord, SignalsConfig};
use crate::util::{window_days, window_start};

pub const REASON_NO_SYSTEM_SIGNALS: &str = "No system signals detected";
pub const REASON_NO_PRIORITY_SIGNALS: &str = "No high-priority signals detected";

/// Categories that escalate straight to HIGH.
const HIGH_CATEGORIES: &[&str] = &[CATEGORY_RFP, CATEGORY_ERP_REPLACEMENT];

/// Categories that escalate to MEDIUM when nothing reached HIGH.
const MEDIUM_CATEGORIES: &[&str] = &[
    CATEGORY_EXPANSION,
    CATEGORY_C_LEVEL,
    CATEGORY_CLEVEL,
    CATEGORY_SECTOR,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalLevel {
    Low,
    Medium,
    High,
}

impl SignalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalLevel::High => "HIGH",
            SignalLevel::Medium => "MEDIUM",
            SignalLevel::Low => "LOW",
        }
    }
}

/// Derived, never persisted. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialSignal {
    pub signal_level: SignalLevel,
    pub reasons: Vec<String>,
    pub last_signal_at: Option<DateTime<Utc>>,
    pub last_signal_category: Option<String>,
    pub last_signal_agent: Option<String>,
    pub last_signal_source_url: Option<String>,
    pub last_signal_confidence: Option<String>,
}

impl CommercialSignal {
    fn without_system_signals() -> Self {
        Self {
            signal_level: SignalLevel::Low,
            reasons: vec![REASON_NO_SYSTEM_SIGNALS.to_string()],
            last_signal_at: None,
            last_signal_category: None,
            last_signal_agent: None,
            last_signal_source_url: None,
            last_signal_confidence: None,
        }
    }
}

/// Tunables for the burst rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierPolicy {
    pub burst_window: Duration,
    pub burst_threshold: usize,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            burst_window: Duration::days(14),
            burst_threshold: 2,
        }
    }
}

impl From<&SignalsConfig> for ClassifierPolicy {
    fn from(config: &SignalsConfig) -> Self {
        Self {
            burst_window: window_days(config.burst_window_days),
            burst_threshold: config.burst_threshold.max(1),
        }
    }
}

/// Classify with the default 14-day / 2-signal burst rule.
pub fn classify_commercial_signal(
    activities: &[ActivityRecord],
    now: DateTime<Utc>,
) -> CommercialSignal {
    classify_with_policy(activities, now, &ClassifierPolicy::default())
}

/// Classify a lead's activity list. Non-SYSTEM entries are ignored.
pub fn classify_with_policy(
    activities: &[ActivityRecord],
    now: DateTime<Utc>,
    policy: &ClassifierPolicy,
) -> CommercialSignal {
    let mut system: Vec<&ActivityRecord> = activities.iter().filter(|a| a.is_system()).collect();
    if system.is_empty() {
        return CommercialSignal::without_system_signals();
    }

    // Stable sort: equal timestamps keep their input order.
    system.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let parsed: Vec<ParsedSystemMeta> = system
        .iter()
        .map(|a| parse_system_note(a.notes.as_deref()))
        .collect();

    let latest = &parsed[0];
    let mut level = SignalLevel::Low;
    let mut reasons: Vec<String> = Vec::new();

    // HIGH: buying-intent categories, one reason per distinct category.
    let mut seen_high: Vec<&str> = Vec::new();
    for category in parsed.iter().filter_map(|m| m.category.as_deref()) {
        if HIGH_CATEGORIES.contains(&category) && !seen_high.contains(&category) {
            seen_high.push(category);
            reasons.push(format!("{} detected", category));
            level = SignalLevel::High;
        }
    }

    // HIGH: confidence, reported once for the most recent such note.
    if let Some(meta) = parsed
        .iter()
        .find(|m| m.confidence.as_deref() == Some(CONFIDENCE_HIGH))
    {
        reasons.push(format!(
            "High confidence signal from {}",
            meta.agent.as_deref().unwrap_or("agent")
        ));
        level = SignalLevel::High;
    }

    if level != SignalLevel::High {
        for category in parsed.iter().filter_map(|m| m.category.as_deref()) {
            if !MEDIUM_CATEGORIES.contains(&category) {
                continue;
            }
            let reason = medium_category_reason(category);
            if !reasons.contains(&reason) {
                reasons.push(reason);
            }
            level = SignalLevel::Medium;
        }

        let cutoff = window_start(now, policy.burst_window);
        let recent = system.iter().filter(|a| a.created_at >= cutoff).count();
        if recent >= policy.burst_threshold {
            reasons.push(format!(
                "{} system signals in the last {} days",
                recent,
                policy.burst_window.num_days()
            ));
            level = SignalLevel::Medium;
        }
    }

    if reasons.is_empty() {
        reasons.push(REASON_NO_PRIORITY_SIGNALS.to_string());
    }

    log::debug!(
        "commercial signal: {} from {} system notes ({})",
        level.as_str(),
        system.len(),
        reasons.join("; ")
    );

    CommercialSignal {
        signal_level: level,
        reasons,
        last_signal_at: Some(system[0].created_at),
        last_signal_category: latest.category.clone(),
        last_signal_agent: latest.agent.clone(),
        last_signal_source_url: sanitize_source_url(latest.source_url.as_deref()),
        last_signal_confidence: latest.confidence.clone(),
    }
}

fn medium_category_reason(category: &str) -> String {
    match category {
        CATEGORY_EXPANSION => "Recent expansion signal".to_string(),
        CATEGORY_C_LEVEL | CATEGORY_CLEVEL => "C-level change detected".to_string(),
        CATEGORY_SECTOR => "Sector investment signal".to_string(),
        other => format!("{} detected", other),
    }
}
