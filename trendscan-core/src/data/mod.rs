//! Data layer: price providers, the price fetcher, caching, and the ticker universe.

pub mod cache;
pub mod circuit_breaker;
pub mod csv_dir;
pub mod fetcher;
pub mod provider;
pub mod universe;
pub mod wikipedia;
pub mod yahoo;

pub use cache::TtlCache;
pub use circuit_breaker::CircuitBreaker;
pub use csv_dir::CsvDirProvider;
pub use fetcher::{PriceCache, PriceCacheKey, PriceFetcher};
pub use provider::{DataError, PriceProvider};
pub use universe::{
    FileSource, StaticSource, TickerSource, UniverseCache, UniverseError, UniverseFile,
    UniverseListing, UniverseProvider, UniverseWarning,
};
pub use wikipedia::{TableMatch, WikipediaSource};
pub use yahoo::YahooProvider;
