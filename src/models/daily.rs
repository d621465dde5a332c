use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// DailyMetricRow: one (date, campaign) row of the daily mart
// ---------------------------------------------------------------------------

/// A single row of the pre-aggregated daily campaign mart.
///
/// `active_customers` is a daily snapshot. Summing it across days counts a
/// customer once per day they were active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricRow {
    pub transaction_date: NaiveDate,
    pub campaign_id: String,
    pub campaign_name: String,
    pub active_customers: i64,
    pub transaction_count: i64,
    pub total_revenue: f64,
    pub average_ticket: f64,
}

// ---------------------------------------------------------------------------
// DailyTable: the loaded, immutable mart
// ---------------------------------------------------------------------------

/// The daily mart as loaded from the warehouse.
///
/// Immutable once built; the dashboard shares it behind an `Arc` for the
/// lifetime of a cache entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyTable {
    rows: Vec<DailyMetricRow>,
}

impl DailyTable {
    pub fn new(rows: Vec<DailyMetricRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[DailyMetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest `transaction_date` in the table.
    ///
    /// An empty table reports today's date for both ends.
    pub fn date_bounds(&self) -> (NaiveDate, NaiveDate) {
        let min = self.rows.iter().map(|r| r.transaction_date).min();
        let max = self.rows.iter().map(|r| r.transaction_date).max();
        match (min, max) {
            (Some(min), Some(max)) => (min, max),
            _ => {
                let today = Local::now().date_naive();
                (today, today)
            }
        }
    }

    /// Sorted distinct campaign names, skipping blanks.
    pub fn campaign_names(&self) -> Vec<String> {
        distinct_sorted(self.rows.iter().map(|r| r.campaign_name.as_str()))
    }

    /// Sorted distinct campaign ids, skipping blanks.
    pub fn campaign_ids(&self) -> Vec<String> {
        distinct_sorted(self.rows.iter().map(|r| r.campaign_id.as_str()))
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
