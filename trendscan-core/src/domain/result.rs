//! ScanResult — one matching ticker with its entry and exit levels.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A ticker whose latest bar satisfied the entry rule.
///
/// Built only by [`crate::signal::EntryRule::evaluate`]; every indicator field
/// is defined by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub ticker: String,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub close: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub rolling_high: f64,
    /// Percent change over the rate-of-change window.
    pub aroc: f64,
    pub entry_recommendation: f64,
    pub sell_recommendation: f64,
}
