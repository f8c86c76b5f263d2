//! Run summary output.
//!
//! Next to the CSV reports, every run writes `run_summary.json` with the
//! mode, timings and per-kind counts:
//!
//! ```text
//! outputs/
//! ├── hiring_signals.csv
//! ├── conversation_signals_people.csv
//! ├── conversation_signals_publishers.csv
//! └── run_summary.json
//! ```

use crate::error::ReportError;
use crate::models::RunSummary;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

pub const SUMMARY_FILE_NAME: &str = "run_summary.json";

/// Serialize a [`RunSummary`] into `dir/run_summary.json`.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn write_run_summary(summary: &RunSummary, dir: &Path) -> Result<PathBuf, ReportError> {
    let json = serde_json::to_string_pretty(summary)?;
    let path = dir.join(SUMMARY_FILE_NAME);

    info!(path = %path.display(), "Writing run summary");
    fs::write(&path, json).await.map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KindSummary;

    #[tokio::test]
    async fn test_write_run_summary() {
        let dir = tempfile::tempdir().unwrap();
        let summary = RunSummary {
            generated_at: "2025-10-03 09:05:00".to_string(),
            mode: "sample".to_string(),
            elapsed_secs: 1.5,
            companies: KindSummary {
                mentions: 40,
                unique_entities: 12,
                ranked: 12,
                output_file: Some("outputs/hiring_signals.csv".to_string()),
                ..KindSummary::default()
            },
            people: KindSummary::default(),
            publishers: KindSummary::default(),
        };

        let path = write_run_summary(&summary, dir.path()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["mode"], "sample");
        assert_eq!(value["companies"]["unique_entities"], 12);
        assert_eq!(value["companies"]["output_file"], "outputs/hiring_signals.csv");
        assert_eq!(value["people"]["ranked"], 0);
    }
}
