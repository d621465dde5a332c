//! Text and JSON rendering of a dashboard page.
//!
//! The text form is meant for a terminal: KPI cards, horizontal bar charts
//! scaled to the largest value, and fixed-width tables. The JSON form carries
//! the same series for an external charting front end.

use std::fmt;

use crate::error::Result;
use crate::models::{DashboardReport, FilterOptions, Page};
use crate::report::format::{currency, integer, percent, signed_percent};

const BAR_WIDTH: usize = 40;
const ACTIVE_CUSTOMERS_LABEL: &str = "Active customers (daily sum)";
const ACTIVE_CUSTOMERS_HELP: &str =
    "sum of daily active customers; a customer active on several days is counted once per day";

pub fn render_text(page: &Page) -> String {
    TextPage(page).to_string()
}

pub fn render_json(page: &Page) -> Result<String> {
    Ok(serde_json::to_string_pretty(page)?)
}

pub fn render_options_text(options: &FilterOptions) -> String {
    TextOptions(options).to_string()
}

struct TextPage<'a>(&'a Page);

impl fmt::Display for TextPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Page::Empty { period, notice } => {
                writeln!(f, "Period: {}", period)?;
                writeln!(f, "WARNING: {}", notice)
            }
            Page::Ready(report) => write_report(f, report),
        }
    }
}

fn write_report(f: &mut fmt::Formatter<'_>, report: &DashboardReport) -> fmt::Result {
    let kpis = &report.kpis;
    let current = &kpis.current;
    let previous = kpis.previous.as_ref();

    writeln!(f, "Executive Marketing Dashboard")?;
    writeln!(
        f,
        "Period: {} ({} days)",
        report.period,
        report.insights.period_days
    )?;
    writeln!(
        f,
        "Campaign: {} | Campaign ID: {}",
        report.campaign_name.as_deref().unwrap_or("All"),
        report.campaign_id.as_deref().unwrap_or("All")
    )?;
    match previous {
        Some(prior) => writeln!(f, "Compared with: {}", prior.window)?,
        None => writeln!(f, "Compared with: (comparison off)")?,
    }

    section(f, "KPIs")?;
    kpi_line(f, "Revenue", &currency(Some(current.revenue)), kpis.deltas.revenue, previous.is_some())?;
    kpi_line(
        f,
        "Transactions",
        &integer(Some(current.transaction_count)),
        kpis.deltas.transaction_count,
        previous.is_some(),
    )?;
    kpi_line(
        f,
        ACTIVE_CUSTOMERS_LABEL,
        &integer(Some(current.active_customer_day_sum)),
        None,
        false,
    )?;
    kpi_line(
        f,
        "Avg ticket (weighted)",
        &currency(current.weighted_avg_ticket),
        kpis.deltas.weighted_avg_ticket,
        previous.is_some(),
    )?;
    writeln!(f, "  ({})", ACTIVE_CUSTOMERS_HELP)?;

    section(f, "Revenue over time")?;
    let max_revenue = max_of(report.daily.iter().map(|p| p.total_revenue));
    for point in &report.daily {
        bar_line(
            f,
            &point.transaction_date.to_string(),
            point.total_revenue,
            max_revenue,
            &currency(Some(point.total_revenue)),
        )?;
    }

    section(f, "Daily transactions")?;
    let max_count = max_of(report.daily.iter().map(|p| p.transaction_count as f64));
    for point in &report.daily {
        bar_line(
            f,
            &point.transaction_date.to_string(),
            point.transaction_count as f64,
            max_count,
            &integer(Some(point.transaction_count)),
        )?;
    }

    section(f, "Efficiency (weighted avg ticket)")?;
    let max_ticket = max_of(report.daily.iter().filter_map(|p| p.weighted_ticket));
    for point in &report.daily {
        bar_line(
            f,
            &point.transaction_date.to_string(),
            point.weighted_ticket.unwrap_or(0.0),
            max_ticket,
            &currency(point.weighted_ticket),
        )?;
    }

    section(f, "Revenue mix (by campaign)")?;
    let total: f64 = report.revenue_mix.iter().map(|s| s.total_revenue).sum();
    let max_slice = max_of(report.revenue_mix.iter().map(|s| s.total_revenue));
    for slice in &report.revenue_mix {
        let share = if total > 0.0 {
            Some(slice.total_revenue / total)
        } else {
            None
        };
        bar_line(
            f,
            &slice.campaign_name,
            slice.total_revenue,
            max_slice,
            &format!("{} ({})", currency(Some(slice.total_revenue)), percent(share)),
        )?;
    }

    section(f, "Top campaigns (revenue)")?;
    writeln!(f, "  {:<4} {:<12} {:<28} {:>16} {:>12}", "#", "ID", "Campaign", "Revenue", "Transactions")?;
    for (i, entry) in report.ranking.iter().enumerate() {
        writeln!(
            f,
            "  {:<4} {:<12} {:<28} {:>16} {:>12}",
            i + 1,
            truncate(&entry.campaign_id, 12),
            truncate(&entry.campaign_name, 28),
            currency(Some(entry.total_revenue)),
            integer(Some(entry.transaction_count))
        )?;
    }

    section(f, "Insights")?;
    if let Some(best) = &report.insights.best_day {
        writeln!(f, "  Best day:  {} • {}", best.transaction_date, currency(Some(best.total_revenue)))?;
    }
    if let Some(worst) = &report.insights.worst_day {
        writeln!(f, "  Worst day: {} • {}", worst.transaction_date, currency(Some(worst.total_revenue)))?;
    }
    writeln!(
        f,
        "  Period:    {} ({} days)",
        report.insights.period, report.insights.period_days
    )?;
    if let Some(prior) = previous {
        writeln!(f, "  Compared with the previous period:")?;
        writeln!(
            f,
            "  - Revenue: {} (before: {})",
            currency(Some(current.revenue)),
            currency(Some(prior.totals.revenue))
        )?;
        writeln!(
            f,
            "  - Transactions: {} (before: {})",
            integer(Some(current.transaction_count)),
            integer(Some(prior.totals.transaction_count))
        )?;
        writeln!(
            f,
            "  - Ticket: {} (before: {})",
            currency(current.weighted_avg_ticket),
            currency(prior.totals.weighted_avg_ticket)
        )?;
    }

    match &report.search {
        Some(query) => section(f, &format!("Data (search: \"{}\", {} rows)", query, report.rows.len()))?,
        None => section(f, &format!("Data ({} rows)", report.rows.len()))?,
    }
    writeln!(
        f,
        "  {:<10} {:<12} {:<28} {:>8} {:>8} {:>16} {:>14}",
        "Date", "ID", "Campaign", "Active", "Tx", "Revenue", "Avg ticket"
    )?;
    for row in &report.rows {
        writeln!(
            f,
            "  {:<10} {:<12} {:<28} {:>8} {:>8} {:>16} {:>14}",
            row.transaction_date.to_string(),
            truncate(&row.campaign_id, 12),
            truncate(&row.campaign_name, 28),
            integer(Some(row.active_customers)),
            integer(Some(row.transaction_count)),
            currency(Some(row.total_revenue)),
            currency(Some(row.average_ticket))
        )?;
    }

    Ok(())
}

struct TextOptions<'a>(&'a FilterOptions);

impl fmt::Display for TextOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = self.0;
        writeln!(f, "Dates available: {} → {}", options.min_date, options.max_date)?;
        writeln!(f, "Default period:  {}", options.default_period)?;
        section(f, "Campaigns")?;
        for name in &options.campaign_names {
            writeln!(f, "  {}", name)?;
        }
        section(f, "Campaign IDs")?;
        for id in &options.campaign_ids {
            writeln!(f, "  {}", id)?;
        }
        Ok(())
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(title.chars().count()))
}

fn kpi_line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: &str,
    delta: Option<f64>,
    comparing: bool,
) -> fmt::Result {
    if comparing {
        writeln!(f, "  {:<30} {:>18}  {:>8}", label, value, signed_percent(delta))
    } else {
        writeln!(f, "  {:<30} {:>18}", label, value)
    }
}

fn bar_line(f: &mut fmt::Formatter<'_>, label: &str, value: f64, max: f64, shown: &str) -> fmt::Result {
    writeln!(
        f,
        "  {:<28} {:<width$} {}",
        truncate(label, 28),
        bar(value, max),
        shown,
        width = BAR_WIDTH
    )
}

/// A bar of up to [`BAR_WIDTH`] cells proportional to `value / max`.
fn bar(value: f64, max: f64) -> String {
    if max.is_nan() || max <= 0.0 || value.is_nan() || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(cells.clamp(1, BAR_WIDTH))
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, f64::max)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
