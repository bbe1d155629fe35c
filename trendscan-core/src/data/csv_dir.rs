//! Offline price provider backed by a directory of CSV files.
//!
//! Layout: `{dir}/{TICKER}.csv` with a header row
//! `date,open,high,low,close,volume`. Only `date` and `close` are required;
//! missing price columns copy the close and missing volume is zero.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use super::provider::{DataError, PriceProvider};
use crate::domain::PriceBar;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

impl From<CsvRow> for PriceBar {
    fn from(row: CsvRow) -> Self {
        PriceBar {
            date: row.date,
            open: row.open.unwrap_or(row.close),
            high: row.high.unwrap_or(row.close),
            low: row.low.unwrap_or(row.close),
            close: row.close,
            volume: row.volume.map_or(0, |v| v.max(0.0) as u64),
        }
    }
}

pub struct CsvDirProvider {
    dir: PathBuf,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a ticker. The symbol is used verbatim as the file stem.
    pub fn ticker_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }

    /// Load every bar in a ticker's file, in file order.
    pub fn load_all(&self, ticker: &str) -> Result<Vec<PriceBar>, DataError> {
        let path = self.ticker_path(ticker);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: ticker.to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| DataError::Io(format!("{}: {e}", path.display())))?;

        reader
            .deserialize::<CsvRow>()
            .map(|row| {
                row.map(PriceBar::from)
                    .map_err(|e| DataError::Parse(format!("{}: {e}", path.display())))
            })
            .collect()
    }
}

impl PriceProvider for CsvDirProvider {
    fn name(&self) -> &str {
        "csv_directory"
    }

    fn fetch_range(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError> {
        let mut bars = self.load_all(ticker)?;
        bars.retain(|b| b.date >= start && b.date <= end);
        Ok(bars)
    }
}
