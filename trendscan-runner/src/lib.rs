//! TrendScan runner — configuration, scan orchestration, progress, export.

pub mod config;
pub mod export;
pub mod progress;
pub mod scanner;

pub use config::{ConfigError, FetchSettings, ScanConfig, ScanParams, UniverseSettings, UniverseSourceKind};
pub use export::{export_results_csv, export_results_json, save_results, ExportFormat, DEFAULT_OUTPUT_FILE};
pub use progress::{ChannelProgress, ConsoleProgress, NoProgress, ProgressEvent, ScanProgress};
pub use scanner::{
    analyze_ticker, normalize_tickers, run_scan, scan_universe, ScanError, ScanOptions,
    ScanReport, ScanSummary, TickerOutcome, TickerWarning,
};
