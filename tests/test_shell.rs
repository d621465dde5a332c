//! Tests for the interactive session loop.

mod common;

use campaign_dashboard::config::EXPORT_FILE_NAME;
use campaign_dashboard::{shell, DashboardRequest};

fn run_session(script: &str) -> (String, tempfile::TempDir) {
    let (dashboard, tmp) = common::setup_dashboard();
    let request = DashboardRequest {
        period: Some("2023-08-01..2023-08-10".parse().unwrap()),
        ..DashboardRequest::default()
    };
    let mut out = Vec::new();
    shell::run(&dashboard, request, script.as_bytes(), &mut out).unwrap();
    (String::from_utf8(out).unwrap(), tmp)
}

#[test]
fn renders_once_and_quits() {
    let (out, _tmp) = run_session("quit\n");
    assert_eq!(out.matches("Executive Marketing Dashboard").count(), 1);
}

#[test]
fn filter_changes_rerender() {
    let (out, _tmp) = run_session("campaign Loyalty Points\ncompare off\nquit\n");
    assert_eq!(out.matches("Executive Marketing Dashboard").count(), 3);
    assert!(out.contains("Campaign: Loyalty Points"));
    assert!(out.contains("(comparison off)"));
}

#[test]
fn empty_selection_shows_warning_and_recovers() {
    let (out, _tmp) = run_session("campaign Nope\ncampaign all\nperiod default\n");
    assert!(out.contains("WARNING: No data"));
    assert!(out.contains("Period: 2023-07-22 → 2023-08-10"));
}

// ---------------------------------------------------------------------------
// Period bounds
// ---------------------------------------------------------------------------

#[test]
fn period_is_limited_to_available_dates() {
    let (out, _tmp) = run_session("period 2023-07-01..2023-09-30\n");
    assert!(out.contains("note: dates limited to 2023-07-22 → 2023-08-10"));
    assert!(out.contains("Period: 2023-07-22 → 2023-08-10"));
    assert!(!out.contains("WARNING: No data"));
}

#[test]
fn period_past_the_data_lands_on_the_last_day() {
    let (out, _tmp) = run_session("period 2030-01-01\n");
    assert!(out.contains("Period: 2023-08-10 → 2023-08-10"));
    assert!(!out.contains("WARNING: No data"));
}

#[test]
fn period_inside_the_data_is_kept_without_note() {
    let (out, _tmp) = run_session("period 2023-08-03..2023-08-04\n");
    assert!(out.contains("Period: 2023-08-03 → 2023-08-04"));
    assert!(!out.contains("note:"));
}

#[test]
fn bad_commands_do_not_end_the_session() {
    let (out, _tmp) = run_session("bogus\ncompare sometimes\nshow\n");
    assert!(out.contains("error: unknown command 'bogus'"));
    assert!(out.contains("error: compare expects on or off"));
    assert_eq!(out.matches("Executive Marketing Dashboard").count(), 2);
}

#[test]
fn export_writes_into_the_given_dir() {
    let (dashboard, tmp) = common::setup_dashboard();
    let out_dir = tmp.path().join("exports");
    let script = format!("search loyalty\nexport {}\nquit\n", out_dir.display());

    let mut out = Vec::new();
    shell::run(&dashboard, DashboardRequest::default(), script.as_bytes(), &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("exported to"));
    let csv = std::fs::read_to_string(out_dir.join(EXPORT_FILE_NAME)).unwrap();
    assert_eq!(csv.lines().count(), 11);
}

#[test]
fn failed_export_is_reported_and_the_session_continues() {
    let (dashboard, tmp) = common::setup_dashboard();
    let blocker = tmp.path().join("not-a-dir");
    std::fs::write(&blocker, "plain file").unwrap();
    let script = format!("export {}\nshow\nquit\n", blocker.join("sub").display());

    let mut out = Vec::new();
    shell::run(&dashboard, DashboardRequest::default(), script.as_bytes(), &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("error:"));
    assert!(!text.contains("exported to"));
    assert_eq!(text.matches("Executive Marketing Dashboard").count(), 2);
}

#[test]
fn help_and_options_do_not_rerender() {
    let (out, _tmp) = run_session("help\noptions\n");
    assert!(out.contains("Commands:"));
    assert!(out.contains("Dates available: 2023-07-22 → 2023-08-10"));
    assert_eq!(out.matches("Executive Marketing Dashboard").count(), 1);
}
