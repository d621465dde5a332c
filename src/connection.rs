//! DuckDB connection wrapper with mart source registration and query execution.
//!
//! The in-process DuckDB database stands in for the warehouse. A mart source
//! is registered before each fetch: database files are attached read-only,
//! CSV and Parquet exports are exposed as a view named after the table.

use crate::error::Result;
use crate::source::{SourceKind, SourceManager};
use crate::sql_builder::{quote_ident, quote_literal, quote_qualified};
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use std::cell::RefCell;
use std::collections::HashMap;

/// Catalog alias for attached mart databases.
const MART_CATALOG: &str = "mart";

/// Wraps a DuckDB connection and registers mart sources on demand.
pub struct Connection {
    conn: DuckDbConnection,
    /// Resolves (and downloads) mart locations.
    pub sources: RefCell<SourceManager>,
}

impl Connection {
    /// Create a connection backed by the given source manager.
    ///
    /// Opens an in-memory DuckDB database.
    pub fn new(sources: SourceManager) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            sources: RefCell::new(sources),
        })
    }

    /// Make `table` at `location` queryable and return the SQL reference to it.
    ///
    /// Re-registering replaces the previous registration, so a refetch sees
    /// the source's current contents.
    pub fn register_source(&self, location: &str, table: &str) -> Result<String> {
        let resolved = self.sources.borrow_mut().resolve(location)?;
        // Use forward slashes for DuckDB compatibility
        let path_str = resolved.path.to_string_lossy().replace('\\', "/");

        let table_ref = match resolved.kind {
            SourceKind::Database => self.attach_database(&path_str, table)?,
            SourceKind::Csv => self.register_file_view(
                table,
                &format!(
                    "read_csv_auto({}, header = true, all_varchar = true)",
                    quote_literal(&path_str)
                ),
            )?,
            SourceKind::Parquet => self.register_file_view(
                table,
                &format!("read_parquet({})", quote_literal(&path_str)),
            )?,
        };

        tracing::info!(source = %location, table = %table_ref, "registered mart source");
        Ok(table_ref)
    }

    fn attach_database(&self, path_str: &str, table: &str) -> Result<String> {
        self.conn.execute_batch(&format!(
            "DETACH DATABASE IF EXISTS {catalog}; \
             ATTACH {path} AS {catalog} (READ_ONLY)",
            catalog = quote_ident(MART_CATALOG),
            path = quote_literal(path_str),
        ))?;
        Ok(format!(
            "{}.{}",
            quote_ident(MART_CATALOG),
            quote_qualified(in_attached_catalog(table))
        ))
    }

    fn register_file_view(&self, table: &str, reader: &str) -> Result<String> {
        let view = quote_ident(view_name(table));
        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM {}",
            view, reader
        ))?;
        Ok(view)
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    /// Automatically converts DuckDB types to `serde_json::Value`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available after execution
        let column_names: Vec<String> = match rows_result.as_ref() {
            Some(executed) => executed
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            None => Vec::new(),
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }
}

/// The part of a dotted table name that lives inside the attached database.
///
/// A `catalog.schema.table` name keeps `schema.table`; the attached file is
/// always addressed as [`MART_CATALOG`], whatever the warehouse called it.
fn in_attached_catalog(table: &str) -> &str {
    let mut dots = table.rmatch_indices('.');
    match (dots.next(), dots.next()) {
        (Some(_), Some((catalog_end, _))) => &table[catalog_end + 1..],
        _ => table,
    }
}

/// Views over file exports take the last segment of a dotted table name.
fn view_name(table: &str) -> &str {
    table.rsplit('.').next().map(str::trim).unwrap_or(table)
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; fall back to its decimal text
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        // The loader casts every column to DOUBLE or VARCHAR, so other
        // types only show up in ad-hoc queries.
        _ => serde_json::Value::Null,
    }
}
