//! Presentation: charts series, revenue mix, ranking and insights.
//!
//! Everything here is grouping and sorting over rows the filter engine
//! already selected; the KPI numbers come in precomputed.

pub mod format;
pub mod render;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::config;
use crate::filter::{self, Selection};
use crate::kpi::weighted_ticket;
use crate::models::{
    DailyMetricRow, DailyPoint, DashboardReport, DayHighlight, Insights, KpiSet, MixSlice,
    RankedCampaign,
};
use crate::period::Period;

pub use render::{render_json, render_options_text, render_text};

/// Assemble the full report for a non-empty current slice.
pub fn build(
    selection: &Selection,
    current: &[DailyMetricRow],
    kpis: KpiSet,
    search: Option<&str>,
) -> DashboardReport {
    let daily = daily_series(current);
    let insights = insights(&daily, selection.period);

    let mut rows = filter::search(current, search.unwrap_or(""));
    rows.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));

    DashboardReport {
        period: selection.period,
        campaign_name: selection.campaign_name.clone(),
        campaign_id: selection.campaign_id.clone(),
        kpis,
        revenue_mix: revenue_mix(current),
        ranking: top_campaigns(current, config::RANKING_SIZE),
        daily,
        insights,
        search: search
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string),
        rows,
    }
}

/// Per-day totals, oldest first.
pub fn daily_series(rows: &[DailyMetricRow]) -> Vec<DailyPoint> {
    let mut by_day: BTreeMap<_, (f64, i64, i64)> = BTreeMap::new();
    for row in rows {
        let entry = by_day.entry(row.transaction_date).or_default();
        entry.0 += row.total_revenue;
        entry.1 += row.transaction_count;
        entry.2 += row.active_customers;
    }

    by_day
        .into_iter()
        .map(|(day, (revenue, count, active))| DailyPoint {
            transaction_date: day,
            total_revenue: revenue,
            transaction_count: count,
            active_customers: active,
            weighted_ticket: weighted_ticket(revenue, count),
        })
        .collect()
}

/// Revenue per campaign name, largest first.
///
/// With more than [`config::MIX_MAX_SLICES`] campaigns, everything after the
/// top `MIX_MAX_SLICES - 1` is summed into one "Other" slice.
pub fn revenue_mix(rows: &[DailyMetricRow]) -> Vec<MixSlice> {
    let mut by_name: HashMap<&str, f64> = HashMap::new();
    for row in rows {
        *by_name.entry(row.campaign_name.as_str()).or_default() += row.total_revenue;
    }

    let mut mix: Vec<MixSlice> = by_name
        .into_iter()
        .map(|(name, revenue)| MixSlice {
            campaign_name: name.to_string(),
            total_revenue: revenue,
        })
        .collect();
    mix.sort_by(|a, b| {
        descending(a.total_revenue, b.total_revenue).then_with(|| a.campaign_name.cmp(&b.campaign_name))
    });

    collapse_mix(mix)
}

/// Fold the tail of an already-sorted mix into "Other".
pub fn collapse_mix(mut mix: Vec<MixSlice>) -> Vec<MixSlice> {
    if mix.len() <= config::MIX_MAX_SLICES {
        return mix;
    }
    let tail = mix.split_off(config::MIX_MAX_SLICES - 1);
    mix.push(MixSlice {
        campaign_name: config::MIX_OTHER_LABEL.to_string(),
        total_revenue: tail.iter().map(|s| s.total_revenue).sum(),
    });
    mix
}

/// Campaigns by revenue, keyed on (id, name), at most `limit` entries.
pub fn top_campaigns(rows: &[DailyMetricRow], limit: usize) -> Vec<RankedCampaign> {
    let mut by_campaign: HashMap<(&str, &str), (f64, i64)> = HashMap::new();
    for row in rows {
        let entry = by_campaign
            .entry((row.campaign_id.as_str(), row.campaign_name.as_str()))
            .or_default();
        entry.0 += row.total_revenue;
        entry.1 += row.transaction_count;
    }

    let mut ranking: Vec<RankedCampaign> = by_campaign
        .into_iter()
        .map(|((id, name), (revenue, count))| RankedCampaign {
            campaign_id: id.to_string(),
            campaign_name: name.to_string(),
            total_revenue: revenue,
            transaction_count: count,
        })
        .collect();
    ranking.sort_by(|a, b| {
        descending(a.total_revenue, b.total_revenue).then_with(|| a.campaign_id.cmp(&b.campaign_id))
    });
    ranking.truncate(limit);
    ranking
}

/// Best and worst day by revenue over the daily series.
///
/// Ties go to the earliest day.
pub fn insights(daily: &[DailyPoint], period: Period) -> Insights {
    let highlight = |p: &DailyPoint| DayHighlight {
        transaction_date: p.transaction_date,
        total_revenue: p.total_revenue,
    };

    let mut best: Option<&DailyPoint> = None;
    let mut worst: Option<&DailyPoint> = None;
    for point in daily {
        if best.map_or(true, |b| point.total_revenue > b.total_revenue) {
            best = Some(point);
        }
        if worst.map_or(true, |w| point.total_revenue < w.total_revenue) {
            worst = Some(point);
        }
    }

    Insights {
        best_day: best.map(highlight),
        worst_day: worst.map(highlight),
        period,
        period_days: period.length_days(),
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
