//! CSV report files.
//!
//! Each report is rendered in memory and written in one go, so a failed run
//! never leaves a half-written file behind. The header row is always written,
//! including for an empty report.

use super::rows::ReportRow;
use crate::error::ReportError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Render rows as CSV text with a header line.
pub fn render<R: ReportRow>(rows: &[R]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(vec![]);
    writer.write_record(R::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.into_error().into()))
}

/// Write `rows` to `R::FILE_NAME` inside `dir` and return the file path.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), file = R::FILE_NAME, rows = rows.len()))]
pub async fn write_report<R: ReportRow>(dir: &Path, rows: &[R]) -> Result<PathBuf, ReportError> {
    let bytes = render(rows)?;
    let path = dir.join(R::FILE_NAME);
    fs::write(&path, bytes).await.map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "Wrote report");
    Ok(path)
}
