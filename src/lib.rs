//! Executive campaign analytics over a daily marketing mart.
//!
//! Reads a pre-aggregated `(date, campaign)` mart through an in-process
//! DuckDB database, filters it by period and campaign, computes
//! period-over-period KPIs against the equal-length window right before the
//! selection, and renders charts, rankings and a CSV export.
//!
//! # Quick start
//!
//! ```no_run
//! use campaign_dashboard::{Dashboard, DashboardRequest, PeriodInput};
//!
//! let dashboard = Dashboard::builder()
//!     .source("data/raw/mrt_campaign_daily.csv")
//!     .build()
//!     .unwrap();
//!
//! let request = DashboardRequest {
//!     period: Some("2023-08-01..2023-08-31".parse::<PeriodInput>().unwrap()),
//!     ..DashboardRequest::default()
//! };
//! let page = dashboard.render(&request).unwrap();
//! println!("{}", campaign_dashboard::report::render_text(&page));
//! ```

pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod filter;
pub mod fixtures;
pub mod kpi;
pub mod loader;
pub mod logging;
pub mod models;
pub mod period;
pub mod report;
pub mod shell;
pub mod source;
pub mod sql_builder;

pub use cache::{Clock, ResultCache, SystemClock, TtlCache};
pub use connection::Connection;
pub use error::{DashboardError, Result};
pub use filter::Selection;
pub use loader::MartLoader;
pub use models::{DailyMetricRow, DailyTable, FilterOptions, KpiSet, Page};
pub use period::{Period, PeriodInput};
pub use source::SourceManager;
pub use sql_builder::SqlBuilder;

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Cache slot type for the loaded mart.
pub type TableCache = Box<dyn ResultCache<Arc<DailyTable>>>;

const EMPTY_NOTICE: &str = "No data for the selected period and filters.";

// ---------------------------------------------------------------------------
// DashboardRequest
// ---------------------------------------------------------------------------

/// One interaction's worth of filter state.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    /// `None` means the date filter was left untouched and the default
    /// lookback selection applies.
    pub period: Option<PeriodInput>,
    pub campaign_name: Option<String>,
    pub campaign_id: Option<String>,
    pub compare_previous: bool,
    pub search: Option<String>,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self {
            period: None,
            campaign_name: None,
            campaign_id: None,
            compare_previous: true,
            search: None,
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Dashboard`].
///
/// Use [`Dashboard::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](DashboardBuilder::build).
pub struct DashboardBuilder {
    source: Option<String>,
    table: String,
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    cache_ttl: Duration,
    cache: Option<TableCache>,
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self {
            source: None,
            table: config::DEFAULT_TABLE.to_string(),
            cache_dir: None,
            offline: false,
            timeout: config::HTTP_TIMEOUT,
            cache_ttl: config::CACHE_TTL,
            cache: None,
        }
    }
}

impl DashboardBuilder {
    /// Where the mart lives: a `.duckdb`/`.db` file, a `.csv`, `.csv.gz` or
    /// `.parquet` export, or an `http(s)://` URL to an export. Required.
    pub fn source(mut self, location: impl Into<String>) -> Self {
        self.source = Some(location.into());
        self
    }

    /// Table (or view) name to read; may be dotted. Defaults to
    /// [`config::DEFAULT_TABLE`].
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Directory for downloaded remote exports.
    ///
    /// If not set, the platform cache directory is used
    /// (e.g. `~/.cache/campaign-dashboard` on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Never download; only reuse previously downloaded exports.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for remote exports. Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Freshness window of the loaded mart. Defaults to 10 minutes.
    /// Ignored when a custom cache is supplied.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Replace the default [`TtlCache`] around the mart fetch.
    pub fn cache(mut self, cache: impl ResultCache<Arc<DailyTable>> + 'static) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    /// Build the dashboard. Does not fetch anything yet; the mart is loaded
    /// on first use.
    pub fn build(self) -> Result<Dashboard> {
        let location = self.source.ok_or_else(|| {
            DashboardError::InvalidArgument("no mart source configured".to_string())
        })?;
        let sources = SourceManager::new(self.cache_dir, self.offline, self.timeout)?;
        let conn = Connection::new(sources)?;
        let cache: TableCache = match self.cache {
            Some(cache) => cache,
            None => Box::new(TtlCache::<Arc<DailyTable>>::new(self.cache_ttl)),
        };

        Ok(Dashboard {
            conn,
            loader: MartLoader::new(location, self.table),
            cache: RefCell::new(cache),
        })
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// The dashboard pipeline: load → normalize period → filter → KPIs → report.
///
/// Every call to [`render`](Dashboard::render) runs the whole pipeline; only
/// the mart fetch is cached.
pub struct Dashboard {
    conn: Connection,
    loader: MartLoader,
    cache: RefCell<TableCache>,
}

impl Dashboard {
    /// Create a new builder for configuring the dashboard.
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::default()
    }

    /// The loaded mart, fetched through the cache.
    ///
    /// Fetch failures propagate; nothing is retried.
    pub fn table(&self) -> Result<Arc<DailyTable>> {
        let mut cache = self.cache.borrow_mut();
        cache.get_or_try_insert_with(&mut || self.loader.load(&self.conn).map(Arc::new))
    }

    /// Invalidate the cached mart so the next render refetches it.
    pub fn refresh(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Values offered by the filter controls.
    pub fn options(&self) -> Result<FilterOptions> {
        let table = self.table()?;
        let (min_date, max_date) = table.date_bounds();
        Ok(FilterOptions {
            min_date,
            max_date,
            default_period: Period::default_for_bounds(min_date, max_date),
            campaign_names: table.campaign_names(),
            campaign_ids: table.campaign_ids(),
        })
    }

    /// Constrain a user-entered period to the dates the mart covers.
    ///
    /// [`render`](Dashboard::render) takes periods as given; interactive
    /// front ends pass their input through here first.
    pub fn bounded_period(&self, input: PeriodInput) -> Result<PeriodInput> {
        let (min, max) = self.table()?.date_bounds();
        let bounded = input.clamped(min, max);
        if bounded != input {
            tracing::info!(?input, ?bounded, %min, %max, "period clamped to available dates");
        }
        Ok(bounded)
    }

    /// Run the pipeline for one request.
    ///
    /// Returns [`Page::Empty`] when the current selection has no rows; the
    /// comparison window being empty is not a reason to stop.
    pub fn render(&self, request: &DashboardRequest) -> Result<Page> {
        let table = self.table()?;
        let selection = selection_for(&table, request);

        let current = selection.apply(table.rows());
        if current.is_empty() {
            tracing::warn!(period = %selection.period, "no rows for the current selection");
            return Ok(Page::Empty {
                period: selection.period,
                notice: EMPTY_NOTICE.to_string(),
            });
        }

        let comparison = if request.compare_previous {
            let window = selection.period.comparison_window();
            Some((window, selection.with_period(window).apply(table.rows())))
        } else {
            None
        };

        let kpis = KpiSet::compute(
            &current,
            comparison
                .as_ref()
                .map(|(window, rows)| (*window, rows.as_slice())),
        );

        let report = report::build(&selection, &current, kpis, request.search.as_deref());
        Ok(Page::Ready(Box::new(report)))
    }

    /// Export the rows the data table currently shows to
    /// [`config::EXPORT_FILE_NAME`] in `dir`.
    ///
    /// Returns `None` without writing anything when the page is empty.
    pub fn export(&self, request: &DashboardRequest, dir: &Path) -> Result<Option<PathBuf>> {
        match self.render(request)? {
            Page::Ready(report) => export::write_export(&report.rows, dir).map(Some),
            Page::Empty { .. } => Ok(None),
        }
    }

    /// The loader this dashboard reads through.
    pub fn loader(&self) -> &MartLoader {
        &self.loader
    }
}

fn selection_for(table: &DailyTable, request: &DashboardRequest) -> Selection {
    let (min, max) = table.date_bounds();
    let period = match &request.period {
        Some(input) => Period::normalize(input, min, max),
        None => Period::default_for_bounds(min, max),
    };
    Selection {
        period,
        campaign_name: request.campaign_name.clone(),
        campaign_id: request.campaign_id.clone(),
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources = self.conn.sources.borrow();
        write!(
            f,
            "Dashboard(source={}, table={}, cache_dir={}, offline={})",
            self.loader.location(),
            self.loader.table(),
            sources.cache_dir.display(),
            sources.offline
        )
    }
}
