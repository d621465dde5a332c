//! Mart source resolution and remote export downloads.
//!
//! A mart location is either a local file (a DuckDB database, or a CSV /
//! Parquet export of the table) or an `http(s)://` URL to such an export.
//! Remote exports are downloaded into the cache directory on every fetch so
//! an expired result cache always sees fresh data; offline mode reuses the
//! last downloaded copy instead.

use crate::config;
use crate::error::{DashboardError, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How DuckDB should read a resolved source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A DuckDB database file containing the mart table.
    Database,
    /// A CSV export, optionally gzip-compressed.
    Csv,
    Parquet,
}

impl SourceKind {
    /// Infer the kind from a file name or URL path.
    pub fn detect(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        let lower = lower.split(['?', '#']).next().unwrap_or("");
        if lower.ends_with(".duckdb") || lower.ends_with(".db") {
            Ok(SourceKind::Database)
        } else if lower.ends_with(".csv") || lower.ends_with(".csv.gz") {
            Ok(SourceKind::Csv)
        } else if lower.ends_with(".parquet") {
            Ok(SourceKind::Parquet)
        } else {
            Err(DashboardError::InvalidArgument(format!(
                "Unsupported mart source '{}': expected .duckdb, .db, .csv, .csv.gz or .parquet",
                name
            )))
        }
    }
}

/// A source resolved to a readable local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub path: PathBuf,
    pub kind: SourceKind,
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolves mart locations, downloading remote exports into a local cache.
pub struct SourceManager {
    /// Directory where downloaded exports are stored.
    pub cache_dir: PathBuf,
    /// If true, never download (reuse previously downloaded exports only).
    pub offline: bool,
    timeout: Duration,
    client: Option<Client>,
}

impl SourceManager {
    /// Create a new source manager.
    ///
    /// If `cache_dir` is `None`, uses the platform-appropriate default cache directory.
    /// Creates the cache directory if it does not exist.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
            timeout,
            client: None,
        })
    }

    /// Lazy HTTP client, created on first use.
    fn client(&mut self) -> Result<Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Resolve `location` to a local file DuckDB can read.
    pub fn resolve(&mut self, location: &str) -> Result<ResolvedSource> {
        let kind = SourceKind::detect(location)?;

        if !is_remote(location) {
            let path = PathBuf::from(location);
            if !path.exists() {
                return Err(DashboardError::NotFound(format!(
                    "Mart source {} does not exist",
                    path.display()
                )));
            }
            return Ok(ResolvedSource { path, kind });
        }

        let local_path = self.cache_dir.join(download_file_name(location));
        if self.offline {
            if local_path.exists() {
                tracing::info!(path = %local_path.display(), "offline: using cached mart export");
                return Ok(ResolvedSource { path: local_path, kind });
            }
            return Err(DashboardError::NotFound(format!(
                "Mart export {} not cached and offline mode is enabled",
                location
            )));
        }

        self.download_file(location, &local_path)?;
        Ok(ResolvedSource { path: local_path, kind })
    }

    /// Download a remote export.
    ///
    /// Downloads to a temp file first and renames on success, so an
    /// interrupted download never replaces a good copy with a partial one.
    fn download_file(&mut self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!(%url, "downloading mart export");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_dest = dest.with_extension(format!(
            "{}.tmp",
            dest.extension().and_then(|e| e.to_str()).unwrap_or("")
        ));

        let client = self.client()?;
        let result = (|| -> Result<()> {
            let resp = client.get(url).send()?.error_for_status()?;
            let bytes = resp.bytes()?;
            fs::write(&tmp_dest, &bytes)?;
            fs::rename(&tmp_dest, dest)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_dest);
        }

        result
    }
}

/// Last URL path segment, without query string or fragment.
fn download_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .filter(|segment| !segment.contains(':'))
        .unwrap_or("mart.csv")
        .to_string()
}
