//! Price fetcher — turns (ticker, lookback weeks) into a canonical series.
//!
//! Computes the date window, calls the provider, canonicalizes the bars, and
//! consults an optional injected cache. Failures are returned as values so
//! the caller can skip the ticker.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use super::cache::TtlCache;
use super::provider::{DataError, PriceProvider};
use crate::domain::PriceSeries;

/// Cache key for one fetch. The end date is part of the key so a cache that
/// outlives midnight never serves yesterday's window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceCacheKey {
    pub ticker: String,
    pub lookback_weeks: usize,
    pub end: NaiveDate,
}

pub type PriceCache = TtlCache<PriceCacheKey, PriceSeries>;

pub struct PriceFetcher {
    provider: Arc<dyn PriceProvider>,
    cache: Option<Arc<PriceCache>>,
}

impl PriceFetcher {
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self {
            provider,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<PriceCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    /// Fetch bars from `lookback_weeks` weeks ago through today.
    pub fn fetch(&self, ticker: &str, lookback_weeks: usize) -> Result<PriceSeries, DataError> {
        self.fetch_as_of(ticker, lookback_weeks, chrono::Local::now().date_naive())
    }

    /// Fetch bars in `[end - lookback_weeks, end]`.
    pub fn fetch_as_of(
        &self,
        ticker: &str,
        lookback_weeks: usize,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let load = || -> Result<PriceSeries, DataError> {
            let start = lookback_start(end, lookback_weeks);
            let bars = self.provider.fetch_range(ticker, start, end)?;
            Ok(PriceSeries::canonicalize(ticker, bars))
        };

        match &self.cache {
            Some(cache) => {
                let key = PriceCacheKey {
                    ticker: ticker.to_string(),
                    lookback_weeks,
                    end,
                };
                if let Some(series) = cache.get(&key) {
                    debug!(ticker, lookback_weeks, "price cache hit");
                    return Ok(series);
                }
                cache.get_or_try_insert_with(key, load)
            }
            None => load(),
        }
    }
}

/// First date of the window ending at `end`. Saturates at the earliest
/// representable date for absurd lookbacks.
pub fn lookback_start(end: NaiveDate, lookback_weeks: usize) -> NaiveDate {
    i64::try_from(lookback_weeks)
        .ok()
        .and_then(Duration::try_weeks)
        .and_then(|d| end.checked_sub_signed(d))
        .unwrap_or(NaiveDate::MIN)
}
