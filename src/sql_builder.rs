//! SELECT construction and identifier quoting for warehouse reads.
//!
//! Table and column names come from configuration, so they are always quoted
//! as identifiers; file paths embedded in registration SQL are quoted as
//! string literals. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use campaign_dashboard::SqlBuilder;
//! let sql = SqlBuilder::new("\"mrt_campaign_daily\"")
//!     .select(&["transaction_date", "campaign_id"])
//!     .order_by(&["transaction_date ASC"])
//!     .build();
//! assert_eq!(sql, "SELECT transaction_date, campaign_id\nFROM \"mrt_campaign_daily\"\nORDER BY transaction_date ASC");
//! ```

/// Quote a single identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a dotted name (`catalog.schema.table`) part by part.
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(|part| quote_ident(part.trim()))
        .collect::<Vec<_>>()
        .join(".")
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Builds a SELECT over one table.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    order_by_cols: Vec<String>,
}

impl SqlBuilder {
    /// Create a builder reading from `table`, which must already be quoted.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            order_by_cols: Vec::new(),
        }
    }

    /// Set the columns or expressions to select (replaces the default `*`).
    pub fn select<S: AsRef<str>>(&mut self, cols: &[S]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Add ORDER BY clauses (e.g. `"transaction_date ASC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Build the final SQL string.
    pub fn build(&self) -> String {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        parts.join("\n")
    }
}
