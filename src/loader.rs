//! Daily mart loader: one read query, best-effort type coercion.
//!
//! Schema drift is tolerated rather than reported: numeric columns that do
//! not parse become zero, integer columns are truncated toward zero, and a
//! row whose date does not parse is dropped (it could never fall inside a
//! date filter anyway).

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

use crate::config;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{DailyMetricRow, DailyTable};
use crate::sql_builder::{quote_ident, SqlBuilder};

/// Reads the daily mart from one source location.
#[derive(Debug, Clone)]
pub struct MartLoader {
    location: String,
    table: String,
}

impl MartLoader {
    pub fn new(location: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            table: table.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// The SELECT issued against `table_ref`.
    ///
    /// Dates are normalized through TIMESTAMP so both DATE columns and
    /// date-time strings land on a calendar day; numerics go through
    /// `TRY_CAST` so garbage reads as NULL instead of failing the query.
    pub fn query(table_ref: &str) -> String {
        let [date, id, name, active, count, revenue, ticket] = config::MART_COLUMNS;
        let exprs = vec![
            format!(
                "CAST(TRY_CAST(TRY_CAST({} AS TIMESTAMP) AS DATE) AS VARCHAR) AS {}",
                quote_ident(date),
                date
            ),
            format!("CAST({} AS VARCHAR) AS {}", quote_ident(id), id),
            format!("CAST({} AS VARCHAR) AS {}", quote_ident(name), name),
            numeric_expr(active),
            numeric_expr(count),
            numeric_expr(revenue),
            numeric_expr(ticket),
        ];

        SqlBuilder::new(table_ref)
            .select(exprs.as_slice())
            .order_by(&["transaction_date ASC", "campaign_id ASC"])
            .build()
    }

    /// Fetch and coerce the mart.
    ///
    /// Fetch failures (missing file, network, unknown table) propagate.
    pub fn load(&self, conn: &Connection) -> Result<DailyTable> {
        let table_ref = conn.register_source(&self.location, &self.table)?;
        let raw = conn.execute(&Self::query(&table_ref), &[])?;
        let fetched = raw.len();

        let rows: Vec<DailyMetricRow> = raw.iter().filter_map(coerce_row).collect();

        let dropped = fetched - rows.len();
        if dropped > 0 {
            tracing::warn!(dropped, "dropped mart rows with an unparseable transaction_date");
        }
        tracing::info!(rows = rows.len(), table = %self.table, "loaded daily mart");

        Ok(DailyTable::new(rows))
    }
}

fn numeric_expr(column: &str) -> String {
    format!("TRY_CAST({} AS DOUBLE) AS {}", quote_ident(column), column)
}

fn coerce_row(row: &HashMap<String, Value>) -> Option<DailyMetricRow> {
    let transaction_date = row
        .get("transaction_date")
        .and_then(|v| v.as_str())
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())?;

    Some(DailyMetricRow {
        transaction_date,
        campaign_id: coerce_text(row.get("campaign_id")),
        campaign_name: coerce_text(row.get("campaign_name")),
        active_customers: coerce_int(row.get("active_customers")),
        transaction_count: coerce_int(row.get("transaction_count")),
        total_revenue: coerce_float(row.get("total_revenue")),
        average_ticket: coerce_float(row.get("average_ticket")),
    })
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_float(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

fn coerce_int(value: Option<&Value>) -> i64 {
    coerce_float(value).trunc() as i64
}
