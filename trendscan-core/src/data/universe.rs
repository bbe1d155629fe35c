//! Ticker universe — the union of one or more ticker sources.
//!
//! A failing or empty source is a warning, not an error: the listing carries
//! whatever the other sources produced. Only the caller decides whether an
//! empty listing is fatal (a scan treats it as a blocking halt).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::cache::TtlCache;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UniverseError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("no table matching {0}")]
    TableNotFound(String),

    #[error("table has no column matching {0}")]
    ColumnNotFound(String),

    #[error("read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("parse universe file: {0}")]
    Parse(String),
}

/// A supplier of raw ticker symbols.
pub trait TickerSource: Send + Sync {
    /// Short label used in warnings and as the cache key.
    fn name(&self) -> &str;

    fn fetch_tickers(&self) -> Result<Vec<String>, UniverseError>;
}

/// A fixed, in-memory ticker list.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    tickers: Vec<String>,
}

impl StaticSource {
    pub fn new<S: Into<String>>(name: impl Into<String>, tickers: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            tickers: tickers.into_iter().map(Into::into).collect(),
        }
    }
}

impl TickerSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_tickers(&self) -> Result<Vec<String>, UniverseError> {
        Ok(self.tickers.clone())
    }
}

/// Named ticker lists stored as TOML:
///
/// ```toml
/// [lists]
/// watchlist = ["AAPL", "MSFT"]
/// energy = ["XOM", "CVX"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniverseFile {
    #[serde(default)]
    pub lists: BTreeMap<String, Vec<String>>,
}

impl UniverseFile {
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        toml::from_str(content).map_err(|e| UniverseError::Parse(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, UniverseError> {
        toml::to_string_pretty(self).map_err(|e| UniverseError::Parse(e.to_string()))
    }

    /// Every ticker across every list, in list order.
    pub fn all_tickers(&self) -> Vec<String> {
        self.lists.values().flatten().cloned().collect()
    }
}

/// Ticker source that reads a [`UniverseFile`] from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = format!("file:{}", path.display());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TickerSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_tickers(&self) -> Result<Vec<String>, UniverseError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| UniverseError::Read {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(UniverseFile::from_toml(&content)?.all_tickers())
    }
}

/// A source that produced nothing usable.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseWarning {
    pub source: String,
    pub message: String,
}

/// Result of listing the universe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniverseListing {
    /// Deduplicated, sorted symbols.
    pub tickers: Vec<String>,
    pub warnings: Vec<UniverseWarning>,
}

impl UniverseListing {
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }
}

pub type UniverseCache = TtlCache<String, Vec<String>>;

#[derive(Default)]
pub struct UniverseProvider {
    sources: Vec<Box<dyn TickerSource>>,
    cache: Option<Arc<UniverseCache>>,
}

impl UniverseProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl TickerSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn push_source(&mut self, source: Box<dyn TickerSource>) {
        self.sources.push(source);
    }

    pub fn with_cache(mut self, cache: Arc<UniverseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    fn fetch_source(&self, source: &dyn TickerSource) -> Result<Vec<String>, UniverseError> {
        match &self.cache {
            Some(cache) => {
                let key = source.name().to_string();
                if let Some(tickers) = cache.get(&key) {
                    debug!(source = source.name(), "universe cache hit");
                    return Ok(tickers);
                }
                let tickers = source.fetch_tickers()?;
                // An empty answer is treated like a failure; keep it out of the cache.
                if !tickers.is_empty() {
                    cache.insert(key, tickers.clone());
                }
                Ok(tickers)
            }
            None => source.fetch_tickers(),
        }
    }

    /// Union of every source, trimmed, blank entries dropped, sorted.
    ///
    /// Symbols are otherwise kept verbatim; `BRK.B` and `BF-B` stay as given.
    pub fn list_universe(&self) -> UniverseListing {
        let mut tickers = BTreeSet::new();
        let mut warnings = Vec::new();

        for source in &self.sources {
            let message = match self.fetch_source(source.as_ref()) {
                Ok(list) => {
                    let before = tickers.len();
                    let mut usable = 0usize;
                    for symbol in list {
                        let symbol = symbol.trim();
                        if !symbol.is_empty() {
                            usable += 1;
                            tickers.insert(symbol.to_string());
                        }
                    }
                    debug!(
                        source = source.name(),
                        usable,
                        added = tickers.len() - before,
                        "ticker source listed"
                    );
                    if usable > 0 {
                        continue;
                    }
                    "source returned no tickers".to_string()
                }
                Err(e) => e.to_string(),
            };

            warn!(source = source.name(), %message, "ticker source unavailable");
            warnings.push(UniverseWarning {
                source: source.name().to_string(),
                message,
            });
        }

        UniverseListing {
            tickers: tickers.into_iter().collect(),
            warnings,
        }
    }
}
