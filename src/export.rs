//! CSV export of the filtered daily rows.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config;
use crate::error::Result;
use crate::models::DailyMetricRow;

/// Serialize rows as UTF-8 CSV with a header row of the mart column names.
///
/// The header is written even when `rows` is empty.
pub fn to_csv<W: Write>(rows: &[DailyMetricRow], out: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(config::MART_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write rows to [`config::EXPORT_FILE_NAME`] inside `dir`.
///
/// The file is written next to its destination and renamed into place, so
/// an existing export is never left half-overwritten.
pub fn write_export(rows: &[DailyMetricRow], dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let dest = dir.join(config::EXPORT_FILE_NAME);

    let mut tmp = NamedTempFile::new_in(dir)?;
    to_csv(rows, tmp.as_file_mut())?;
    tmp.persist(&dest)?;

    tracing::info!(rows = rows.len(), path = %dest.display(), "exported filtered rows");
    Ok(dest)
}
