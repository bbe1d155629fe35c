//! TrendScan Core — domain types, indicator engine, entry rule, data layer.
//!
//! This crate contains everything a single-ticker analysis needs:
//! - Domain types (price bars, price series, scan results)
//! - Trailing-window indicators (SMA, rolling high, rate of change)
//! - The indicator frame built from a series
//! - The composite entry rule and exit-level derivation
//! - Price providers (Yahoo Finance, offline CSV), the price fetcher and its cache
//! - Ticker sources and the universe provider

pub mod data;
pub mod domain;
pub mod indicators;
pub mod signal;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: per-ticker types can move across worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::PriceBar>();
        require_sync::<domain::PriceBar>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::ScanResult>();
        require_sync::<domain::ScanResult>();

        require_send::<indicators::IndicatorFrame>();
        require_sync::<indicators::IndicatorFrame>();
        require_send::<signal::EntryRule>();
        require_sync::<signal::EntryRule>();

        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::PriceFetcher>();
        require_sync::<data::PriceFetcher>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
    }

    /// The entry rule sees one frame row and nothing else: no portfolio, no
    /// other tickers, no earlier scans.
    #[test]
    fn entry_rule_is_a_pure_row_function() {
        fn _check(
            rule: &signal::EntryRule,
            ticker: &str,
            row: &indicators::FrameRow,
        ) -> Option<domain::ScanResult> {
            rule.evaluate(ticker, row)
        }
    }
}
