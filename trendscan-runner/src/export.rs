//! Result export: CSV (the default artifact) and JSON.
//!
//! CSV floats are written with `Display`, which prints the shortest string
//! that parses back to the same `f64`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use trendscan_core::domain::ScanResult;

pub const DEFAULT_OUTPUT_FILE: &str = "scan_output.csv";

/// CSV columns, in order.
pub const RESULT_COLUMNS: [&str; 9] = [
    "ticker",
    "date",
    "close",
    "sma_short",
    "sma_long",
    "rolling_high",
    "aroc",
    "entry_recommendation",
    "sell_recommendation",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// `.json` selects JSON; any other extension is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// One row per result; header only when `results` is empty.
pub fn export_results_csv(results: &[ScanResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(RESULT_COLUMNS)?;

    for r in results {
        wtr.write_record([
            r.ticker.clone(),
            r.date.to_string(),
            r.close.to_string(),
            r.sma_short.to_string(),
            r.sma_long.to_string(),
            r.rolling_high.to_string(),
            r.aroc.to_string(),
            r.entry_recommendation.to_string(),
            r.sell_recommendation.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_results_json(results: &[ScanResult]) -> Result<String> {
    serde_json::to_string_pretty(results).context("failed to serialize scan results to JSON")
}

/// Write `results` to `path`, picking the format from the extension.
/// Parent directories are created as needed.
pub fn save_results(results: &[ScanResult], path: &Path) -> Result<PathBuf> {
    let content = match ExportFormat::from_path(path) {
        ExportFormat::Csv => export_results_csv(results)?,
        ExportFormat::Json => export_results_json(results)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}
