//! Prioritized work queue across leads.
//!
//! Nothing here is persisted. The queue is rebuilt from each lead's activity
//! log on every call, so changing thresholds in config takes effect on the
//! next read.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::insight::{derive_with_policy, DerivationPolicy, LeadInsight};
use super::sla::SlaStatus;
use super::temperature::Temperature;
use crate::db::{DbError, LeadDb};
use crate::types::{ActivityRecord, Config};
use crate::util::{parse_timestamp, window_days, window_start};

/// Inputs for one lead, as fetched by the caller.
#[derive(Debug, Clone)]
pub struct LeadSnapshot {
    pub lead_id: String,
    pub company_name: String,
    pub stage: String,
    pub created_at: DateTime<Utc>,
    pub last_human_activity_at: Option<DateTime<Utc>>,
    /// SYSTEM activities within the lookback window.
    pub activities: Vec<ActivityRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkQueueItem {
    pub lead_id: String,
    pub company_name: String,
    pub stage: String,
    #[serde(flatten)]
    pub insight: LeadInsight,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkQueueFilter {
    pub temperature: Option<Temperature>,
    pub sla_status: Option<SlaStatus>,
}

impl WorkQueueFilter {
    pub fn matches(&self, item: &WorkQueueItem) -> bool {
        self.temperature
            .map_or(true, |t| item.insight.temperature == t)
            && self.sla_status.map_or(true, |s| item.insight.sla.status == s)
    }
}

/// HOT before WARM before COLD, then the most urgent SLA, then the longest
/// wait, then the freshest signal. Lead id keeps the order total.
fn queue_order(a: &WorkQueueItem, b: &WorkQueueItem) -> Ordering {
    a.insight
        .temperature
        .rank()
        .cmp(&b.insight.temperature.rank())
        .then_with(|| a.insight.sla.status.rank().cmp(&b.insight.sla.status.rank()))
        .then_with(|| {
            b.insight
                .sla
                .hours_elapsed
                .total_cmp(&a.insight.sla.hours_elapsed)
        })
        .then_with(|| {
            b.insight
                .signal
                .last_signal_at
                .cmp(&a.insight.signal.last_signal_at)
        })
        .then_with(|| a.lead_id.cmp(&b.lead_id))
}

pub fn build_work_queue(
    leads: Vec<LeadSnapshot>,
    now: DateTime<Utc>,
    policy: &DerivationPolicy,
    filter: &WorkQueueFilter,
) -> Vec<WorkQueueItem> {
    let total = leads.len();
    let mut items: Vec<WorkQueueItem> = leads
        .into_iter()
        .map(|lead| {
            let insight = derive_with_policy(
                &lead.activities,
                lead.created_at,
                lead.last_human_activity_at,
                now,
                policy,
            );
            WorkQueueItem {
                lead_id: lead.lead_id,
                company_name: lead.company_name,
                stage: lead.stage,
                insight,
            }
        })
        .filter(|item| filter.matches(item))
        .collect();

    items.sort_by(queue_order);
    log::debug!("Work queue: {} of {} leads after filter", items.len(), total);
    items
}

/// Build the queue for every active lead in the database.
///
/// Leads whose `created_at` cannot be read are skipped with a warning.
pub fn load_work_queue(
    db: &LeadDb,
    config: &Config,
    now: DateTime<Utc>,
    filter: &WorkQueueFilter,
) -> Result<Vec<WorkQueueItem>, DbError> {
    let since = window_start(now, window_days(config.signals.lookback_days));
    let mut snapshots = Vec::new();

    for lead in db.get_active_leads()? {
        let Some(created_at) = parse_timestamp(&lead.created_at) else {
            log::warn!(
                "Skipping lead {} with unreadable created_at {:?}",
                lead.id,
                lead.created_at
            );
            continue;
        };
        let activities = db.get_system_activities_since(&lead.id, since)?;
        let last_human_activity_at = db.get_last_human_activity_at(&lead.id)?;
        snapshots.push(LeadSnapshot {
            lead_id: lead.id,
            company_name: lead.company_name,
            stage: lead.stage,
            created_at,
            last_human_activity_at,
            activities,
        });
    }

    Ok(build_work_queue(
        snapshots,
        now,
        &DerivationPolicy::from(config),
        filter,
    ))
}
