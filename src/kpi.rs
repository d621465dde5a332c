//! KPI aggregation and guarded period-over-period deltas.

use crate::models::{DailyMetricRow, KpiDeltas, KpiSet, PeriodTotals, PriorPeriod};
use crate::period::Period;

/// Relative change from `prev` to `curr`.
///
/// `None` when there is no usable baseline: `prev` missing, NaN, or zero.
/// Every period-over-period ratio goes through here.
pub fn safe_delta(curr: f64, prev: Option<f64>) -> Option<f64> {
    match prev {
        Some(prev) if !prev.is_nan() && prev != 0.0 => Some((curr - prev) / prev),
        _ => None,
    }
}

/// Revenue per transaction, or `None` without transactions.
pub fn weighted_ticket(revenue: f64, transaction_count: i64) -> Option<f64> {
    if transaction_count > 0 {
        Some(revenue / transaction_count as f64)
    } else {
        None
    }
}

impl PeriodTotals {
    pub fn from_rows(rows: &[DailyMetricRow]) -> Self {
        let revenue: f64 = rows.iter().map(|r| r.total_revenue).sum();
        let transaction_count: i64 = rows.iter().map(|r| r.transaction_count).sum();
        let active_customer_day_sum: i64 = rows.iter().map(|r| r.active_customers).sum();
        Self {
            revenue,
            transaction_count,
            active_customer_day_sum,
            weighted_avg_ticket: weighted_ticket(revenue, transaction_count),
        }
    }
}

impl KpiSet {
    /// Aggregate the current slice and, when given, compare it against the
    /// comparison window's slice.
    ///
    /// An empty comparison slice is a valid "no prior data" baseline: its
    /// totals are zero and every delta comes out `None`.
    pub fn compute(current: &[DailyMetricRow], previous: Option<(Period, &[DailyMetricRow])>) -> Self {
        let current = PeriodTotals::from_rows(current);

        let previous = previous.map(|(window, rows)| PriorPeriod {
            window,
            totals: PeriodTotals::from_rows(rows),
        });

        let deltas = match &previous {
            Some(prior) => KpiDeltas {
                revenue: safe_delta(current.revenue, Some(prior.totals.revenue)),
                transaction_count: safe_delta(
                    current.transaction_count as f64,
                    Some(prior.totals.transaction_count as f64),
                ),
                weighted_avg_ticket: current
                    .weighted_avg_ticket
                    .and_then(|ticket| safe_delta(ticket, prior.totals.weighted_avg_ticket)),
            },
            None => KpiDeltas::default(),
        };

        Self {
            current,
            previous,
            deltas,
        }
    }
}
