//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over data sources (Yahoo Finance, a
//! directory of CSV files) so we can swap implementations and mock for tests.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::PriceBar;

/// Structured error types for price retrieval.
///
/// Any of these means "skip this ticker"; none of them aborts a scan.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped, retry in {retry_in_secs}s)")]
    CircuitBreakerTripped { retry_in_secs: u64 },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Source of daily bars for a ticker.
///
/// Implementations handle the specifics of one source; the cache and the
/// lookback-date computation live above this trait in
/// [`PriceFetcher`](super::PriceFetcher).
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for `ticker` dated within `[start, end]`.
    ///
    /// An empty vector is a successful answer: the ticker exists but has no
    /// bars in range.
    fn fetch_range(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}
