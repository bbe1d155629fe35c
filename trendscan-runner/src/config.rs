//! Scan configuration: indicator windows, fetch settings, universe sources.
//!
//! Every field has a default, so an empty TOML file is a valid config.
//!
//! ```toml
//! [scan]
//! sma_short_window = 20
//! sma_long_window = 50
//! aroc_weeks = 20
//! tickers = []            # empty = full universe
//!
//! [fetch]
//! timeout_secs = 30
//! max_retries = 2
//! threads = 1
//! price_cache_ttl_secs = 3600
//! universe_cache_ttl_secs = 86400
//! # data_dir = "prices"   # offline CSV directory instead of Yahoo
//!
//! [universe]
//! sources = ["sp500", "nasdaq100"]
//! # file = "universe.toml"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use trendscan_core::data::{
    CircuitBreaker, CsvDirProvider, DataError, FileSource, PriceCache, PriceFetcher,
    UniverseCache, UniverseProvider, WikipediaSource, YahooProvider,
};
use trendscan_core::indicators::{aroc_window_days, required_bars};

pub const DEFAULT_SMA_SHORT: usize = 20;
pub const DEFAULT_SMA_LONG: usize = 50;
pub const DEFAULT_AROC_WEEKS: usize = 20;

pub const SMA_SHORT_RANGE: (usize, usize) = (5, 100);
pub const SMA_LONG_RANGE: (usize, usize) = (10, 200);
pub const AROC_WEEKS_RANGE: (usize, usize) = (4, 52);

/// Extra weeks fetched beyond the rate-of-change window.
pub const LOOKBACK_HEADROOM_WEEKS: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("fetch.threads must be at least 1")]
    NoThreads,

    #[error("read config {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("parse config: {0}")]
    Parse(String),
}

/// Indicator windows for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    pub sma_short_window: usize,
    pub sma_long_window: usize,
    pub aroc_weeks: usize,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            sma_short_window: DEFAULT_SMA_SHORT,
            sma_long_window: DEFAULT_SMA_LONG,
            aroc_weeks: DEFAULT_AROC_WEEKS,
        }
    }
}

fn check_range(
    name: &'static str,
    value: usize,
    (min, max): (usize, usize),
) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

impl ScanParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("sma_short_window", self.sma_short_window, SMA_SHORT_RANGE)?;
        check_range("sma_long_window", self.sma_long_window, SMA_LONG_RANGE)?;
        check_range("aroc_weeks", self.aroc_weeks, AROC_WEEKS_RANGE)?;
        Ok(())
    }

    /// Bars in the rolling-high / rate-of-change window (`aroc_weeks * 5`).
    pub fn aroc_window_days(&self) -> usize {
        aroc_window_days(self.aroc_weeks)
    }

    /// Weeks of history requested per ticker.
    pub fn lookback_weeks(&self) -> usize {
        self.aroc_weeks + LOOKBACK_HEADROOM_WEEKS
    }

    /// Bars needed before the latest bar can carry every indicator.
    pub fn required_bars(&self) -> usize {
        required_bars(self.sma_short_window, self.sma_long_window, self.aroc_weeks)
    }
}

/// `[scan]` section: windows plus an optional explicit ticker subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    #[serde(flatten)]
    pub params: ScanParams,
    pub tickers: Vec<String>,
}

/// `[fetch]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub threads: usize,
    pub price_cache_ttl_secs: u64,
    pub universe_cache_ttl_secs: u64,
    /// Read `{data_dir}/{TICKER}.csv` instead of calling Yahoo Finance.
    pub data_dir: Option<PathBuf>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            threads: 1,
            price_cache_ttl_secs: 3600,
            universe_cache_ttl_secs: 86_400,
            data_dir: None,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Price fetcher for these settings: the CSV directory when `data_dir`
    /// is set, Yahoo Finance otherwise, each behind a TTL cache.
    pub fn build_fetcher(&self) -> Result<PriceFetcher, DataError> {
        let cache = Arc::new(PriceCache::new(Duration::from_secs(self.price_cache_ttl_secs)));
        let fetcher = match &self.data_dir {
            Some(dir) => PriceFetcher::new(Arc::new(CsvDirProvider::new(dir))),
            None => {
                let breaker = Arc::new(CircuitBreaker::default_provider());
                let yahoo = YahooProvider::with_settings(breaker, self.timeout(), self.max_retries)?;
                PriceFetcher::new(Arc::new(yahoo))
            }
        };
        Ok(fetcher.with_cache(cache))
    }
}

/// Built-in ticker lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniverseSourceKind {
    Sp500,
    Nasdaq100,
}

/// `[universe]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseSettings {
    pub sources: Vec<UniverseSourceKind>,
    /// Extra TOML file of named ticker lists, unioned with `sources`.
    pub file: Option<PathBuf>,
}

impl Default for UniverseSettings {
    fn default() -> Self {
        Self {
            sources: vec![UniverseSourceKind::Sp500, UniverseSourceKind::Nasdaq100],
            file: None,
        }
    }
}

impl UniverseSettings {
    pub fn build_provider(&self, fetch: &FetchSettings) -> UniverseProvider {
        let cache = Arc::new(UniverseCache::new(Duration::from_secs(
            fetch.universe_cache_ttl_secs,
        )));
        let mut provider = UniverseProvider::new().with_cache(cache);
        for kind in &self.sources {
            let source = match kind {
                UniverseSourceKind::Sp500 => WikipediaSource::sp500(),
                UniverseSourceKind::Nasdaq100 => WikipediaSource::nasdaq100(),
            };
            provider.push_source(Box::new(source.with_timeout(fetch.timeout())));
        }
        if let Some(path) = &self.file {
            provider.push_source(Box::new(FileSource::new(path)));
        }
        provider
    }
}

/// Complete scan configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scan: ScanSection,
    pub fetch: FetchSettings,
    pub universe: UniverseSettings,
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.params.validate()?;
        if self.fetch.threads == 0 {
            return Err(ConfigError::NoThreads);
        }
        Ok(())
    }
}
