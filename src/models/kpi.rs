use serde::{Deserialize, Serialize};

use crate::period::Period;

// ---------------------------------------------------------------------------
// PeriodTotals: aggregated KPIs over one slice of the mart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub revenue: f64,
    pub transaction_count: i64,
    /// Sum of daily active-customer snapshots, not a distinct customer count.
    pub active_customer_day_sum: i64,
    /// `revenue / transaction_count`, or `None` when there were no transactions.
    pub weighted_avg_ticket: Option<f64>,
}

// ---------------------------------------------------------------------------
// KpiDeltas: period-over-period relative change
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KpiDeltas {
    pub revenue: Option<f64>,
    pub transaction_count: Option<f64>,
    pub weighted_avg_ticket: Option<f64>,
}

// ---------------------------------------------------------------------------
// PriorPeriod / KpiSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorPeriod {
    pub window: Period,
    pub totals: PeriodTotals,
}

/// KPIs for the selected period, optionally paired with the comparison window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub current: PeriodTotals,
    pub previous: Option<PriorPeriod>,
    pub deltas: KpiDeltas,
}
