//! Shared test fixtures for the campaign dashboard integration tests.
//!
//! Provides row builders and `setup_dashboard()`, which writes a small daily
//! mart to a temporary CSV file and opens a [`Dashboard`] over it through a
//! real in-memory DuckDB connection.

#![allow(dead_code)]

use campaign_dashboard::{DailyMetricRow, Dashboard};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Build one mart row; `average_ticket` is derived from revenue and count.
pub fn row(day: NaiveDate, id: &str, name: &str, tx: i64, revenue: f64) -> DailyMetricRow {
    DailyMetricRow {
        transaction_date: day,
        campaign_id: id.to_string(),
        campaign_name: name.to_string(),
        active_customers: tx,
        transaction_count: tx,
        total_revenue: revenue,
        average_ticket: if tx > 0 { revenue / tx as f64 } else { 0.0 },
    }
}

/// A month of data across two campaigns.
///
/// - `CMP_01` "Cashback Reactivation": 2023-07-22..=2023-08-10, 2 tx and
///   R$ 20 per day from August, 3 tx and R$ 15 per day in July.
/// - `CMP_02` "Loyalty Points": 2023-08-01..=2023-08-10, 1 tx and R$ 10 per day.
pub fn sample_rows() -> Vec<DailyMetricRow> {
    let mut rows = Vec::new();
    for d in 22..=31 {
        rows.push(row(date(2023, 7, d), "CMP_01", "Cashback Reactivation", 3, 15.0));
    }
    for d in 1..=10 {
        rows.push(row(date(2023, 8, d), "CMP_01", "Cashback Reactivation", 2, 20.0));
        rows.push(row(date(2023, 8, d), "CMP_02", "Loyalty Points", 1, 10.0));
    }
    rows
}

/// Write `rows` as `mrt_campaign_daily.csv` inside `dir`.
pub fn write_mart_csv(dir: &TempDir, rows: &[DailyMetricRow]) -> PathBuf {
    let path = dir.path().join("mrt_campaign_daily.csv");
    let file = fs::File::create(&path).unwrap();
    campaign_dashboard::export::to_csv(rows, file).unwrap();
    path
}

/// Write raw CSV text (header included) as `mrt_campaign_daily.csv`.
pub fn write_raw_csv(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("mrt_campaign_daily.csv");
    fs::write(&path, contents).unwrap();
    path
}

/// Open a dashboard over `rows` with a temporary cache directory.
///
/// Returns `(Dashboard, TempDir)`. The caller must keep the `TempDir` alive
/// for the duration of the test so the mart file is not deleted prematurely.
pub fn setup_dashboard_with(rows: &[DailyMetricRow]) -> (Dashboard, TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = write_mart_csv(&tmp_dir, rows);
    let dashboard = Dashboard::builder()
        .source(path.to_string_lossy())
        .cache_dir(tmp_dir.path().join("cache"))
        .offline(true)
        .build()
        .unwrap();
    (dashboard, tmp_dir)
}

pub fn setup_dashboard() -> (Dashboard, TempDir) {
    setup_dashboard_with(&sample_rows())
}
