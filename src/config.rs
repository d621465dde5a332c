use std::path::PathBuf;
use std::time::Duration;

/// Default mart table (or view) name queried by the loader.
pub const DEFAULT_TABLE: &str = "mrt_campaign_daily";

/// Columns selected from the mart, in export order.
pub const MART_COLUMNS: [&str; 7] = [
    "transaction_date",
    "campaign_id",
    "campaign_name",
    "active_customers",
    "transaction_count",
    "total_revenue",
    "average_ticket",
];

/// Freshness window of the cached mart fetch.
pub const CACHE_TTL: Duration = Duration::from_secs(600);

/// HTTP timeout for remote mart exports.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Fixed name of the filtered-rows export.
pub const EXPORT_FILE_NAME: &str = "campaign_daily_filtered.csv";

/// Days before the latest date covered by the default period selection.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 60;

/// Above this many campaigns the revenue mix collapses its tail into "Other".
pub const MIX_MAX_SLICES: usize = 8;

/// Label of the synthetic revenue mix bucket.
pub const MIX_OTHER_LABEL: &str = "Other";

/// Rows kept in the campaign ranking.
pub const RANKING_SIZE: usize = 10;

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("campaign-dashboard")
    } else {
        PathBuf::from(".campaign-dashboard-cache")
    }
}
