//! PriceSeries — ascending, duplicate-free daily bars for one ticker.

use super::PriceBar;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("{ticker}: bar {index} dated {date} is not after the previous bar")]
    NotStrictlyIncreasing {
        ticker: String,
        index: usize,
        date: chrono::NaiveDate,
    },
}

/// Ordered bars for one ticker.
///
/// Invariant: dates are strictly increasing. An empty series is valid and
/// means "no data in range", which is distinct from a failed fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting bars that are out of order or duplicated.
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        let ticker = ticker.into();
        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotStrictlyIncreasing {
                    ticker,
                    index: i + 1,
                    date: pair[1].date,
                });
            }
        }
        Ok(Self { ticker, bars })
    }

    /// Build a series from provider output: sort by date, keep the first bar
    /// of any duplicated date.
    pub fn canonicalize(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            bars: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Close column, in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }
}
