//! PriceBar — one trading day for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV snapshot.
///
/// Missing provider fields are stored as `f64::NAN`; indicators treat a
/// non-finite close as "no value" rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Bar with every price set to `close`. Handy for close-only data.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_date_as_iso() {
        let bar = PriceBar::from_close(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 1.5);
        let json = serde_json::to_string(&bar).unwrap();
        assert!(json.contains("\"date\":\"2024-01-02\""));
    }

    #[test]
    fn from_close_fills_every_price() {
        let bar = PriceBar::from_close(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 42.0);
        assert_eq!(bar.open, 42.0);
        assert_eq!(bar.high, 42.0);
        assert_eq!(bar.low, 42.0);
        assert_eq!(bar.volume, 0);
    }
}
