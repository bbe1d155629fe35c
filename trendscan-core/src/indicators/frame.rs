//! Indicator frame — a price series annotated with the scan's derived columns.
//!
//! `compute()` is pure: it reads the close column and returns a new frame,
//! leaving the input series untouched. Window parameters that cannot produce
//! values (zero, or longer than the series) leave the matching column empty
//! instead of failing, so the entry rule simply declines the ticker.

use chrono::NaiveDate;
use serde::Serialize;

use super::{Indicator, RollingHigh, Roc, Sma};
use crate::domain::PriceSeries;

/// Trading days assumed per calendar week.
///
/// An approximation: holidays are ignored, so a window of `weeks * 5` bars
/// can reach slightly further back than `weeks` calendar weeks.
pub const TRADING_DAYS_PER_WEEK: usize = 5;

/// Bars in the rolling-high and rate-of-change window.
pub fn aroc_window_days(aroc_weeks: usize) -> usize {
    aroc_weeks.saturating_mul(TRADING_DAYS_PER_WEEK)
}

/// One bar plus its derived values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rolling_high: Option<f64>,
    pub aroc: Option<f64>,
}

/// Derived columns for a whole series, one row per bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorFrame {
    ticker: String,
    rows: Vec<FrameRow>,
}

impl IndicatorFrame {
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn rows(&self) -> &[FrameRow] {
        &self.rows
    }

    /// The most recent bar, which is the only one the entry rule looks at.
    pub fn latest(&self) -> Option<&FrameRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Number of bars needed before every column can be defined on the last bar.
pub fn required_bars(sma_short_window: usize, sma_long_window: usize, aroc_weeks: usize) -> usize {
    sma_short_window
        .max(sma_long_window)
        .max(aroc_window_days(aroc_weeks).saturating_add(1))
}

/// Compute the scan's derived columns for `series`.
pub fn compute(
    series: &PriceSeries,
    sma_short_window: usize,
    sma_long_window: usize,
    aroc_weeks: usize,
) -> IndicatorFrame {
    let closes = series.closes();
    let window = aroc_window_days(aroc_weeks);

    let sma_short = Sma::new(sma_short_window).compute(&closes);
    let sma_long = Sma::new(sma_long_window).compute(&closes);
    let rolling_high = RollingHigh::new(window).compute(&closes);
    let aroc = Roc::new(window).compute(&closes);

    let rows = series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| FrameRow {
            date: bar.date,
            close: bar.close,
            sma_short: sma_short[i],
            sma_long: sma_long[i],
            rolling_high: rolling_high[i],
            aroc: aroc[i],
        })
        .collect();

    IndicatorFrame {
        ticker: series.ticker().to_string(),
        rows,
    }
}
