//! Composite entry rule and exit-level derivation.
//!
//! The rule fires on a frame row when all four hold:
//! 1. close > sma_short
//! 2. sma_short > sma_long
//! 3. close >= high_proximity * rolling_high
//! 4. aroc > min_aroc_pct
//!
//! Any undefined input makes the rule decline. When it fires the entry is the
//! close and the sell level is the higher of the short SMA and a fixed
//! percentage trailing stop below the entry.

use serde::{Deserialize, Serialize};

use crate::domain::ScanResult;
use crate::indicators::{FrameRow, IndicatorFrame};

pub const DEFAULT_HIGH_PROXIMITY: f64 = 0.95;
pub const DEFAULT_MIN_AROC_PCT: f64 = 5.0;
/// Sell-stop level as a fraction of the entry (a 7% trailing stop).
pub const DEFAULT_TRAILING_STOP_FACTOR: f64 = 0.93;

/// Thresholds for the entry rule. Stateless; safe to share across tickers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryRule {
    /// Fraction of the rolling high the close must reach.
    pub high_proximity: f64,
    /// Rate of change (percentage points) the close must exceed.
    pub min_aroc_pct: f64,
    /// Trailing stop as a fraction of the entry, e.g. `0.93` for 7% below.
    pub trailing_stop_factor: f64,
}

impl Default for EntryRule {
    fn default() -> Self {
        Self {
            high_proximity: DEFAULT_HIGH_PROXIMITY,
            min_aroc_pct: DEFAULT_MIN_AROC_PCT,
            trailing_stop_factor: DEFAULT_TRAILING_STOP_FACTOR,
        }
    }
}

impl EntryRule {
    /// Evaluate one row. `None` means "no signal", never an error.
    pub fn evaluate(&self, ticker: &str, row: &FrameRow) -> Option<ScanResult> {
        let sma_short = row.sma_short?;
        let sma_long = row.sma_long?;
        let rolling_high = row.rolling_high?;
        let aroc = row.aroc?;
        let close = row.close;

        let fires = close > sma_short
            && sma_short > sma_long
            && close >= self.high_proximity * rolling_high
            && aroc > self.min_aroc_pct;
        if !fires {
            return None;
        }

        let entry = close;
        let trailing_stop = self.trailing_stop(entry);

        Some(ScanResult {
            ticker: ticker.to_string(),
            date: row.date,
            close,
            sma_short,
            sma_long,
            rolling_high,
            aroc,
            entry_recommendation: entry,
            sell_recommendation: sma_short.max(trailing_stop),
        })
    }

    /// Evaluate the most recent bar of a frame.
    pub fn evaluate_latest(&self, frame: &IndicatorFrame) -> Option<ScanResult> {
        frame
            .latest()
            .and_then(|row| self.evaluate(frame.ticker(), row))
    }

    /// Stop level `entry * trailing_stop_factor`.
    pub fn trailing_stop(&self, entry: f64) -> f64 {
        entry * self.trailing_stop_factor
    }
}
