//! Trailing-window indicators over the close column.
//!
//! Every indicator maps a close series to an output series of the same
//! length. Positions without a full window, or whose window contains a
//! non-finite close, are `None`. A value at index `i` depends only on
//! closes at indices `<= i`.

pub mod frame;
pub mod roc;
pub mod rolling_high;
pub mod sma;

pub use frame::{
    aroc_window_days, compute, required_bars, FrameRow, IndicatorFrame, TRADING_DAYS_PER_WEEK,
};
pub use roc::Roc;
pub use rolling_high::RollingHigh;
pub use sma::Sma;

/// A close-only trailing indicator.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "roc_100").
    fn name(&self) -> &str;

    /// Number of leading bars that can never carry a value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire close series.
    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>>;
}

/// Build a series of consecutive calendar days from close prices.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::PriceSeries {
    use crate::domain::{PriceBar, PriceSeries};
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar::from_close(base_date + chrono::Duration::days(i as i64), close))
        .collect();
    PriceSeries::new("TEST", bars).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
