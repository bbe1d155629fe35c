//! Scan orchestration: for every ticker fetch, compute, evaluate, collect.
//!
//! A ticker that fails to fetch is skipped with a warning; one with no bars
//! or too little history is skipped quietly. The scan itself only fails before it starts (invalid windows, empty
//! universe, thread pool). Results come back in input order regardless of
//! the thread count.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use trendscan_core::data::{PriceFetcher, UniverseProvider, UniverseWarning};
use trendscan_core::domain::ScanResult;
use trendscan_core::indicators;
use trendscan_core::signal::EntryRule;

use crate::config::{ConfigError, ScanParams};
use crate::progress::ScanProgress;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid scan parameters: {0}")]
    InvalidParams(#[from] ConfigError),

    /// Nothing to scan: every universe source failed or came back empty.
    #[error("ticker universe is empty")]
    EmptyUniverse { warnings: Vec<UniverseWarning> },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

/// What happened to one ticker.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Matched(ScanResult),
    NoSignal,
    /// The provider answered with no bars. Counted, never warned about.
    Empty,
    InsufficientHistory { bars: usize, required: usize },
    FetchFailed(String),
}

impl TickerOutcome {
    pub fn result(&self) -> Option<&ScanResult> {
        match self {
            Self::Matched(r) => Some(r),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Matched(_) => "matched",
            Self::NoSignal => "no_signal",
            Self::Empty => "empty",
            Self::InsufficientHistory { .. } => "insufficient_history",
            Self::FetchFailed(_) => "fetch_failed",
        }
    }
}

/// Knobs for one scan beyond the indicator windows.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub params: ScanParams,
    pub rule: EntryRule,
    /// Last date of the price window; today when `None`.
    pub as_of: Option<NaiveDate>,
    /// Worker threads. `1` scans sequentially on the calling thread.
    pub threads: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            params: ScanParams::default(),
            rule: EntryRule::default(),
            as_of: None,
            threads: 1,
        }
    }
}

impl ScanOptions {
    pub fn new(params: ScanParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }
}

/// A ticker the scan had to skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerWarning {
    pub ticker: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Tickers requested.
    pub total: usize,
    /// Tickers actually attempted (less than `total` only when cancelled).
    pub processed: usize,
    pub matched: usize,
    pub no_signal: usize,
    pub empty: usize,
    pub insufficient_history: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub elapsed_secs: f64,
}

impl ScanSummary {
    fn record(&mut self, outcome: &TickerOutcome) {
        self.processed += 1;
        match outcome {
            TickerOutcome::Matched(_) => self.matched += 1,
            TickerOutcome::NoSignal => self.no_signal += 1,
            TickerOutcome::Empty => self.empty += 1,
            TickerOutcome::InsufficientHistory { .. } => self.insufficient_history += 1,
            TickerOutcome::FetchFailed(_) => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Matching tickers, in input order.
    pub results: Vec<ScanResult>,
    pub summary: ScanSummary,
    pub warnings: Vec<TickerWarning>,
    /// Universe sources that failed; empty for explicit ticker lists.
    pub universe_warnings: Vec<UniverseWarning>,
}

/// Fetch one ticker, compute its indicators and evaluate the latest bar.
pub fn analyze_ticker(
    fetcher: &PriceFetcher,
    ticker: &str,
    params: &ScanParams,
    rule: &EntryRule,
    end: NaiveDate,
) -> TickerOutcome {
    let series = match fetcher.fetch_as_of(ticker, params.lookback_weeks(), end) {
        Ok(series) => series,
        Err(e) => {
            warn!(ticker, error = %e, "fetch failed, skipping");
            return TickerOutcome::FetchFailed(e.to_string());
        }
    };

    if series.is_empty() {
        debug!(ticker, "no price data");
        return TickerOutcome::Empty;
    }

    let required = params.required_bars();
    if series.len() < required {
        debug!(ticker, bars = series.len(), required, "not enough history");
        return TickerOutcome::InsufficientHistory {
            bars: series.len(),
            required,
        };
    }

    let frame = indicators::compute(
        &series,
        params.sma_short_window,
        params.sma_long_window,
        params.aroc_weeks,
    );
    match rule.evaluate_latest(&frame) {
        Some(result) => {
            debug!(ticker, close = result.close, aroc = result.aroc, "entry signal");
            TickerOutcome::Matched(result)
        }
        None => TickerOutcome::NoSignal,
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|f| f.load(Ordering::Relaxed))
}

/// Scan `tickers` and collect every match.
///
/// The cancel flag is checked before each ticker; tickers already in flight
/// finish and are reported.
pub fn run_scan(
    fetcher: &PriceFetcher,
    tickers: &[String],
    options: &ScanOptions,
    progress: &dyn ScanProgress,
    cancel: Option<&AtomicBool>,
) -> Result<ScanReport, ScanError> {
    options.params.validate()?;
    if tickers.is_empty() {
        return Err(ScanError::EmptyUniverse {
            warnings: Vec::new(),
        });
    }

    let start_time = Instant::now();
    let end = options
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let total = tickers.len();
    info!(
        total,
        provider = fetcher.provider_name(),
        %end,
        threads = options.threads,
        "starting scan"
    );

    let scan_one = |index: usize, ticker: &String| -> Option<TickerOutcome> {
        if is_cancelled(cancel) {
            return None;
        }
        progress.on_start(ticker, index, total);
        let outcome = analyze_ticker(fetcher, ticker, &options.params, &options.rule, end);
        progress.on_complete(ticker, index, total, &outcome);
        Some(outcome)
    };

    let outcomes: Vec<Option<TickerOutcome>> = if options.threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;
        pool.install(|| {
            tickers
                .par_iter()
                .enumerate()
                .map(|(i, t)| scan_one(i, t))
                .collect()
        })
    } else {
        let mut outcomes = Vec::with_capacity(total);
        for (i, ticker) in tickers.iter().enumerate() {
            match scan_one(i, ticker) {
                Some(outcome) => outcomes.push(Some(outcome)),
                None => break,
            }
        }
        outcomes
    };

    let mut report = ScanReport {
        summary: ScanSummary {
            total,
            ..Default::default()
        },
        ..Default::default()
    };
    for (ticker, outcome) in tickers.iter().zip(outcomes) {
        let Some(outcome) = outcome else {
            report.summary.cancelled = true;
            continue;
        };
        report.summary.record(&outcome);
        match outcome {
            TickerOutcome::Matched(result) => report.results.push(result),
            TickerOutcome::FetchFailed(message) => report.warnings.push(TickerWarning {
                ticker: ticker.clone(),
                message,
            }),
            TickerOutcome::NoSignal
            | TickerOutcome::Empty
            | TickerOutcome::InsufficientHistory { .. } => {}
        }
    }
    if report.summary.processed < total {
        report.summary.cancelled = true;
    }
    report.summary.elapsed_secs = start_time.elapsed().as_secs_f64();

    info!(
        processed = report.summary.processed,
        matched = report.summary.matched,
        failed = report.summary.failed,
        cancelled = report.summary.cancelled,
        "scan finished"
    );
    progress.on_scan_complete(&report.summary);
    Ok(report)
}

/// Trim, drop blanks and remove repeats, keeping first-seen order.
pub fn normalize_tickers<S: AsRef<str>>(tickers: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    tickers
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

/// Scan the whole universe, or only `subset` when it is non-empty.
///
/// An explicit subset never touches the universe sources. An empty listing
/// halts before any price is fetched.
pub fn scan_universe(
    universe: &UniverseProvider,
    subset: &[String],
    fetcher: &PriceFetcher,
    options: &ScanOptions,
    progress: &dyn ScanProgress,
    cancel: Option<&AtomicBool>,
) -> Result<ScanReport, ScanError> {
    options.params.validate()?;

    let (tickers, universe_warnings) = if subset.is_empty() {
        let listing = universe.list_universe();
        if listing.is_empty() {
            warn!(
                sources = universe.source_count(),
                "no tickers from any universe source"
            );
            return Err(ScanError::EmptyUniverse {
                warnings: listing.warnings,
            });
        }
        info!(tickers = listing.len(), "universe listed");
        (listing.tickers, listing.warnings)
    } else {
        (normalize_tickers(subset), Vec::new())
    };

    let mut report = run_scan(fetcher, &tickers, options, progress, cancel)?;
    report.universe_warnings = universe_warnings;
    Ok(report)
}
