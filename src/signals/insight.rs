//! Per-lead display triple: commercial signal, temperature, human SLA.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::commercial::{classify_with_policy, ClassifierPolicy, CommercialSignal};
use super::sla::{derive_sla_with_policy, HumanSla, SlaPolicy};
use super::temperature::Temperature;
use crate::types::{ActivityRecord, Config};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInsight {
    pub signal: CommercialSignal,
    pub temperature: Temperature,
    pub sla: HumanSla,
}

/// Thresholds for the whole derivation, usually built once from config.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivationPolicy {
    pub classifier: ClassifierPolicy,
    pub sla: SlaPolicy,
}

impl From<&Config> for DerivationPolicy {
    fn from(config: &Config) -> Self {
        Self {
            classifier: ClassifierPolicy::from(&config.signals),
            sla: SlaPolicy::from(&config.sla),
        }
    }
}

/// Derive the triple with default thresholds.
///
/// `activities` is the lead's activity list as fetched by the caller,
/// typically already windowed to the lookback period.
pub fn derive_lead_insight(
    activities: &[ActivityRecord],
    created_at: DateTime<Utc>,
    last_human_activity_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> LeadInsight {
    derive_with_policy(
        activities,
        created_at,
        last_human_activity_at,
        now,
        &DerivationPolicy::default(),
    )
}

pub fn derive_with_policy(
    activities: &[ActivityRecord],
    created_at: DateTime<Utc>,
    last_human_activity_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    policy: &DerivationPolicy,
) -> LeadInsight {
    let signal = classify_with_policy(activities, now, &policy.classifier);
    let temperature = Temperature::from(signal.signal_level);
    let sla = derive_sla_with_policy(last_human_activity_at, created_at, now, &policy.sla);
    LeadInsight {
        signal,
        temperature,
        sla,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::commercial::SignalLevel;
    use crate::signals::sla::SlaStatus;
    use crate::types::ActivityKind;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_hot_lead_with_overdue_sla() {
        let activities = vec![ActivityRecord {
            id: "s1".to_string(),
            kind: ActivityKind::System,
            title: "Tender found".to_string(),
            notes: Some("Category: RFP".to_string()),
            created_at: now() - Duration::days(1),
            completed_at: None,
        }];
        let insight =
            derive_lead_insight(&activities, now() - Duration::days(10), None, now());
        assert_eq!(insight.signal.signal_level, SignalLevel::High);
        assert_eq!(insight.temperature, Temperature::Hot);
        assert_eq!(insight.sla.status, SlaStatus::Overdue);
        assert_eq!(insight.sla.label, "10d");
    }

    #[test]
    fn test_empty_lead_is_cold() {
        let insight = derive_lead_insight(&[], now() - Duration::hours(2), None, now());
        assert_eq!(insight.temperature, Temperature::Cold);
        assert_eq!(insight.sla.status, SlaStatus::Ok);
        assert_eq!(insight.sla.label, "2h");
    }

    #[test]
    fn test_policy_from_config() {
        let config: Config =
            serde_json::from_str(r#"{"sla": {"warningHours": 1, "overdueHours": 2}}"#).unwrap();
        let policy = DerivationPolicy::from(&config);
        let insight = derive_with_policy(&[], now() - Duration::hours(3), None, now(), &policy);
        assert_eq!(insight.sla.status, SlaStatus::Overdue);
    }

    #[test]
    fn test_serializes_camel_case() {
        let insight = derive_lead_insight(&[], now(), None, now());
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["temperature"], "COLD");
        assert_eq!(json["signal"]["signalLevel"], "LOW");
        assert_eq!(json["sla"]["status"], "OK");
        assert!(json["signal"]["lastSignalAt"].is_null());
    }
}
