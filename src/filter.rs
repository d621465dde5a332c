//! Row predicates over the daily mart.

use serde::{Deserialize, Serialize};

use crate::models::DailyMetricRow;
use crate::period::Period;

/// The active filter selection: a date range plus optional exact-match
/// campaign name and id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub period: Period,
    pub campaign_name: Option<String>,
    pub campaign_id: Option<String>,
}

impl Selection {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            campaign_name: None,
            campaign_id: None,
        }
    }

    /// Same campaign predicates over a different date range.
    pub fn with_period(&self, period: Period) -> Self {
        Self {
            period,
            ..self.clone()
        }
    }

    pub fn matches(&self, row: &DailyMetricRow) -> bool {
        self.period.contains(row.transaction_date)
            && self
                .campaign_name
                .as_deref()
                .map_or(true, |name| row.campaign_name == name)
            && self
                .campaign_id
                .as_deref()
                .map_or(true, |id| row.campaign_id == id)
    }

    /// Rows matching every predicate, in input order. May be empty.
    pub fn apply(&self, rows: &[DailyMetricRow]) -> Vec<DailyMetricRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Case-insensitive substring search over campaign name or id.
///
/// A blank query keeps every row.
pub fn search(rows: &[DailyMetricRow], query: &str) -> Vec<DailyMetricRow> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|r| {
            r.campaign_name.to_lowercase().contains(&needle)
                || r.campaign_id.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
