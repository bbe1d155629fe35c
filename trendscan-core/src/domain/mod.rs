//! Domain types for the scanner.

pub mod bar;
pub mod result;
pub mod series;

pub use bar::PriceBar;
pub use result::ScanResult;
pub use series::{PriceSeries, SeriesError};
