use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DailyMetricRow, KpiSet};
use crate::period::Period;

// ---------------------------------------------------------------------------
// DailyPoint: one point of the per-day time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub transaction_date: NaiveDate,
    pub total_revenue: f64,
    pub transaction_count: i64,
    pub active_customers: i64,
    /// `None` on days without transactions.
    pub weighted_ticket: Option<f64>,
}

// ---------------------------------------------------------------------------
// MixSlice / RankedCampaign
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixSlice {
    pub campaign_name: String,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCampaign {
    pub campaign_id: String,
    pub campaign_name: String,
    pub total_revenue: f64,
    pub transaction_count: i64,
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayHighlight {
    pub transaction_date: NaiveDate,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub best_day: Option<DayHighlight>,
    pub worst_day: Option<DayHighlight>,
    pub period: Period,
    pub period_days: i64,
}

// ---------------------------------------------------------------------------
// DashboardReport / Page
// ---------------------------------------------------------------------------

/// Everything the presentation layer shows for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub period: Period,
    pub campaign_name: Option<String>,
    pub campaign_id: Option<String>,
    pub kpis: KpiSet,
    pub daily: Vec<DailyPoint>,
    pub revenue_mix: Vec<MixSlice>,
    pub ranking: Vec<RankedCampaign>,
    pub insights: Insights,
    pub search: Option<String>,
    /// Filtered rows after search, newest first.
    pub rows: Vec<DailyMetricRow>,
}

/// Outcome of one dashboard render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Page {
    /// The current selection matched no rows; nothing else was computed.
    Empty { period: Period, notice: String },
    Ready(Box<DashboardReport>),
}

impl Page {
    pub fn report(&self) -> Option<&DashboardReport> {
        match self {
            Page::Ready(report) => Some(report),
            Page::Empty { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterOptions: values offered by the filter controls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub default_period: Period,
    pub campaign_names: Vec<String>,
    pub campaign_ids: Vec<String>,
}
