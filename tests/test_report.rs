//! Tests for chart series, revenue mix, ranking, insights and formatting.

mod common;

use campaign_dashboard::models::MixSlice;
use campaign_dashboard::report::{self, format};
use campaign_dashboard::{KpiSet, Period, Selection};
use common::{date, row, sample_rows};

fn mix(revenues: &[f64]) -> Vec<MixSlice> {
    revenues
        .iter()
        .enumerate()
        .map(|(i, r)| MixSlice {
            campaign_name: format!("Campaign {}", i + 1),
            total_revenue: *r,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Revenue mix
// ---------------------------------------------------------------------------

#[test]
fn nine_campaigns_collapse_to_top_seven_plus_other() {
    let collapsed = report::collapse_mix(mix(&[100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 30.0, 20.0]));
    assert_eq!(collapsed.len(), 8);
    let kept: Vec<f64> = collapsed[..7].iter().map(|s| s.total_revenue).collect();
    assert_eq!(kept, vec![100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0]);
    assert_eq!(collapsed[7].campaign_name, "Other");
    assert_eq!(collapsed[7].total_revenue, 50.0);
}

#[test]
fn eight_campaigns_are_left_alone() {
    let slices = mix(&[8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
    assert_eq!(report::collapse_mix(slices.clone()), slices);
}

#[test]
fn revenue_mix_groups_by_name_largest_first() {
    let rows = vec![
        row(date(2023, 8, 1), "CMP_01", "Alpha", 1, 10.0),
        row(date(2023, 8, 2), "CMP_01", "Alpha", 1, 15.0),
        row(date(2023, 8, 1), "CMP_02", "Beta", 1, 40.0),
    ];
    let slices = report::revenue_mix(&rows);
    assert_eq!(slices.len(), 2);
    assert_eq!(slices[0].campaign_name, "Beta");
    assert_eq!(slices[1].total_revenue, 25.0);
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[test]
fn ranking_is_capped_and_sorted() {
    let rows: Vec<_> = (1..=12)
        .map(|i| row(date(2023, 8, 1), &format!("CMP_{:02}", i), &format!("C{}", i), i, i as f64 * 10.0))
        .collect();
    let ranking = report::top_campaigns(&rows, 10);
    assert_eq!(ranking.len(), 10);
    assert_eq!(ranking[0].campaign_id, "CMP_12");
    assert_eq!(ranking[0].transaction_count, 12);
    assert_eq!(ranking[9].campaign_id, "CMP_03");
}

#[test]
fn ranking_keys_on_id_and_name() {
    let rows = vec![
        row(date(2023, 8, 1), "CMP_01", "Old name", 1, 10.0),
        row(date(2023, 8, 2), "CMP_01", "New name", 1, 20.0),
    ];
    assert_eq!(report::top_campaigns(&rows, 10).len(), 2);
}

// ---------------------------------------------------------------------------
// Daily series and insights
// ---------------------------------------------------------------------------

#[test]
fn daily_series_sums_campaigns_per_day() {
    let rows = vec![
        row(date(2023, 8, 2), "CMP_01", "A", 2, 30.0),
        row(date(2023, 8, 1), "CMP_01", "A", 1, 10.0),
        row(date(2023, 8, 2), "CMP_02", "B", 1, 15.0),
    ];
    let daily = report::daily_series(&rows);
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].transaction_date, date(2023, 8, 1));
    assert_eq!(daily[1].total_revenue, 45.0);
    assert_eq!(daily[1].transaction_count, 3);
    assert_eq!(daily[1].weighted_ticket, Some(15.0));
}

#[test]
fn daily_ticket_is_none_without_transactions() {
    let rows = vec![row(date(2023, 8, 1), "CMP_01", "A", 0, 30.0)];
    assert_eq!(report::daily_series(&rows)[0].weighted_ticket, None);
}

#[test]
fn insights_pick_best_and_worst_days() {
    let rows = vec![
        row(date(2023, 8, 1), "CMP_01", "A", 1, 100.0),
        row(date(2023, 8, 5), "CMP_01", "A", 1, 200.0),
        row(date(2023, 8, 7), "CMP_01", "A", 1, 100.0),
    ];
    let period = Period {
        start: date(2023, 8, 1),
        end: date(2023, 8, 10),
    };
    let insights = report::insights(&report::daily_series(&rows), period);
    assert_eq!(insights.best_day.unwrap().transaction_date, date(2023, 8, 5));
    // ties go to the earliest day
    assert_eq!(insights.worst_day.unwrap().transaction_date, date(2023, 8, 1));
    assert_eq!(insights.period_days, 10);
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

#[test]
fn build_sorts_rows_newest_first_and_applies_search() {
    let selection = Selection::new(Period {
        start: date(2023, 8, 1),
        end: date(2023, 8, 10),
    });
    let current = selection.apply(&sample_rows());
    let kpis = KpiSet::compute(&current, None);

    let report = report::build(&selection, &current, kpis, Some(" loyalty "));
    assert_eq!(report.search.as_deref(), Some("loyalty"));
    assert_eq!(report.rows.len(), 10);
    assert_eq!(report.rows[0].transaction_date, date(2023, 8, 10));
    assert!(report.rows.iter().all(|r| r.campaign_id == "CMP_02"));
    // search narrows the table only, not the charts
    assert_eq!(report.revenue_mix.len(), 2);
    assert_eq!(report.daily.len(), 10);
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

#[test]
fn brazilian_number_formatting() {
    assert_eq!(format::currency(Some(1234.5)), "R$ 1.234,50");
    assert_eq!(format::currency(Some(1234567.891)), "R$ 1.234.567,89");
    assert_eq!(format::currency(Some(-12.0)), "R$ -12,00");
    assert_eq!(format::integer(Some(1234)), "1.234");
    assert_eq!(format::integer(Some(999)), "999");
    assert_eq!(format::percent(Some(0.123)), "12,3%");
    assert_eq!(format::signed_percent(Some(0.5)), "+50,0%");
    assert_eq!(format::signed_percent(Some(-0.25)), "-25,0%");
}

#[test]
fn missing_values_render_as_dash() {
    assert_eq!(format::currency(None), format::MISSING);
    assert_eq!(format::currency(Some(f64::NAN)), format::MISSING);
    assert_eq!(format::signed_percent(None), format::MISSING);
    assert_eq!(format::integer(None), format::MISSING);
}
