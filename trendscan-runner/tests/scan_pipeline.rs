//! End-to-end scans against in-memory providers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use chrono::{Duration, NaiveDate};
use trendscan_core::data::{
    DataError, PriceFetcher, PriceProvider, StaticSource, TickerSource, UniverseError,
    UniverseProvider,
};
use trendscan_core::domain::PriceBar;
use trendscan_runner::{
    export_results_csv, run_scan, scan_universe, ChannelProgress, NoProgress, ProgressEvent,
    ScanError, ScanOptions, ScanParams, ScanProgress, ScanSummary, TickerOutcome,
};

fn end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

/// Daily bars ending on `end()`, one per close.
fn bars_ending_today(closes: &[f64]) -> Vec<PriceBar> {
    let n = closes.len() as i64;
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::from_close(end() - Duration::days(n - 1 - i as i64), c))
        .collect()
}

/// 60 → 120 in steps of 1: the last bar fires the entry rule with the small
/// windows below.
fn rising() -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..=60).map(|i| 60.0 + i as f64).collect();
    bars_ending_today(&closes)
}

fn flat() -> Vec<PriceBar> {
    bars_ending_today(&[100.0; 61])
}

fn small_params() -> ScanParams {
    ScanParams {
        sma_short_window: 5,
        sma_long_window: 10,
        aroc_weeks: 4,
    }
}

fn options() -> ScanOptions {
    ScanOptions::new(small_params()).as_of(end())
}

enum Canned {
    Bars(Vec<PriceBar>),
    Fail,
}

struct MapProvider {
    data: HashMap<String, Canned>,
    calls: AtomicUsize,
}

impl MapProvider {
    fn new(entries: Vec<(&str, Canned)>) -> Arc<Self> {
        Arc::new(Self {
            data: entries
                .into_iter()
                .map(|(t, c)| (t.to_string(), c))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }
}

impl PriceProvider for MapProvider {
    fn name(&self) -> &str {
        "map"
    }

    fn fetch_range(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.data.get(ticker) {
            Some(Canned::Bars(bars)) => Ok(bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .cloned()
                .collect()),
            Some(Canned::Fail) => Err(DataError::Timeout(format!("{ticker} timed out"))),
            None => Err(DataError::SymbolNotFound {
                symbol: ticker.to_string(),
            }),
        }
    }
}

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn rising_ticker_matches_with_expected_levels() {
    let provider = MapProvider::new(vec![("UP", Canned::Bars(rising()))]);
    let fetcher = PriceFetcher::new(provider);
    let report = run_scan(&fetcher, &tickers(&["UP"]), &options(), &NoProgress, None).unwrap();

    assert_eq!(report.results.len(), 1);
    let r = &report.results[0];
    assert_eq!(r.ticker, "UP");
    assert_eq!(r.date, end());
    assert_eq!(r.close, 120.0);
    assert!((r.sma_short - 118.0).abs() < 1e-9);
    assert!((r.sma_long - 115.5).abs() < 1e-9);
    assert_eq!(r.rolling_high, 120.0);
    assert!((r.aroc - 20.0).abs() < 1e-9);
    assert_eq!(r.entry_recommendation, 120.0);
    // max(sma_short, 0.93 * close) = max(118, 111.6)
    assert!((r.sell_recommendation - 118.0).abs() < 1e-9);
    assert_eq!(report.summary.matched, 1);
    assert!(report.warnings.is_empty());
}

#[test]
fn flat_ticker_produces_no_result() {
    let provider = MapProvider::new(vec![("FLAT", Canned::Bars(flat()))]);
    let fetcher = PriceFetcher::new(provider);
    let report = run_scan(&fetcher, &tickers(&["FLAT"]), &options(), &NoProgress, None).unwrap();
    assert!(report.results.is_empty());
    assert_eq!(report.summary.no_signal, 1);
}

#[test]
fn failing_ticker_is_skipped_and_the_rest_processed() {
    let provider = MapProvider::new(vec![
        ("A", Canned::Bars(rising())),
        ("B", Canned::Bars(flat())),
        ("C", Canned::Fail),
        ("D", Canned::Bars(rising())),
        ("E", Canned::Bars(Vec::new())),
    ]);
    let fetcher = PriceFetcher::new(provider.clone());
    let report = run_scan(
        &fetcher,
        &tickers(&["A", "B", "C", "D", "E"]),
        &options(),
        &NoProgress,
        None,
    )
    .unwrap();

    assert_eq!(provider.calls.load(Ordering::SeqCst), 5);
    assert_eq!(report.summary.processed, 5);
    assert_eq!(report.summary.matched, 2);
    assert_eq!(report.summary.no_signal, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.empty, 1);
    assert!(!report.summary.cancelled);

    let matched: Vec<&str> = report.results.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(matched, vec!["A", "D"]);
    let warned: Vec<&str> = report.warnings.iter().map(|w| w.ticker.as_str()).collect();
    assert_eq!(warned, vec!["C"]);
    assert!(report.warnings[0].message.contains("timed out"));
}

#[test]
fn empty_series_is_skipped_without_a_warning() {
    let provider = MapProvider::new(vec![
        ("NODATA", Canned::Bars(Vec::new())),
        ("UP", Canned::Bars(rising())),
    ]);
    let fetcher = PriceFetcher::new(provider);
    let report = run_scan(
        &fetcher,
        &tickers(&["NODATA", "UP"]),
        &options(),
        &NoProgress,
        None,
    )
    .unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.summary.empty, 1);
    assert_eq!(report.summary.processed, 2);
    assert_eq!(report.results.len(), 1);
}

#[test]
fn short_history_is_not_a_match() {
    let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
    let provider = MapProvider::new(vec![("NEW", Canned::Bars(bars_ending_today(&closes)))]);
    let fetcher = PriceFetcher::new(provider);
    let report = run_scan(&fetcher, &tickers(&["NEW"]), &options(), &NoProgress, None).unwrap();
    assert!(report.results.is_empty());
    assert_eq!(report.summary.insufficient_history, 1);
}

#[test]
fn parallel_scan_keeps_input_order() {
    let names: Vec<String> = (0..24).map(|i| format!("T{i:02}")).collect();
    let entries = names
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let canned = if i % 3 == 0 {
                Canned::Bars(flat())
            } else {
                Canned::Bars(rising())
            };
            (n.as_str(), canned)
        })
        .collect();
    let provider = MapProvider::new(entries);
    let fetcher = PriceFetcher::new(provider);

    let sequential = run_scan(&fetcher, &names, &options(), &NoProgress, None).unwrap();
    let parallel = run_scan(
        &fetcher,
        &names,
        &options().with_threads(4),
        &NoProgress,
        None,
    )
    .unwrap();

    assert_eq!(sequential.results.len(), 16);
    assert_eq!(parallel.results, sequential.results);
}

#[test]
fn preset_cancel_flag_processes_nothing() {
    let provider = MapProvider::new(vec![("A", Canned::Bars(rising()))]);
    let fetcher = PriceFetcher::new(provider.clone());
    let cancel = AtomicBool::new(true);
    let report = run_scan(
        &fetcher,
        &tickers(&["A", "B"]),
        &options(),
        &NoProgress,
        Some(&cancel),
    )
    .unwrap();
    assert!(report.summary.cancelled);
    assert_eq!(report.summary.processed, 0);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

/// Raises the cancel flag once the first ticker completes.
struct CancelAfterFirst<'a> {
    flag: &'a AtomicBool,
}

impl ScanProgress for CancelAfterFirst<'_> {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}

    fn on_complete(&self, _ticker: &str, _index: usize, _total: usize, _outcome: &TickerOutcome) {
        self.flag.store(true, Ordering::Relaxed);
    }

    fn on_scan_complete(&self, _summary: &ScanSummary) {}
}

#[test]
fn cancel_mid_scan_keeps_finished_results() {
    let provider = MapProvider::new(vec![
        ("A", Canned::Bars(rising())),
        ("B", Canned::Bars(rising())),
    ]);
    let fetcher = PriceFetcher::new(provider);
    let cancel = AtomicBool::new(false);
    let progress = CancelAfterFirst { flag: &cancel };
    let report = run_scan(
        &fetcher,
        &tickers(&["A", "B"]),
        &options(),
        &progress,
        Some(&cancel),
    )
    .unwrap();
    assert!(report.summary.cancelled);
    assert_eq!(report.summary.processed, 1);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].ticker, "A");
}

#[test]
fn progress_reports_every_ticker_then_summary() {
    let provider = MapProvider::new(vec![
        ("A", Canned::Bars(rising())),
        ("B", Canned::Fail),
    ]);
    let fetcher = PriceFetcher::new(provider);
    let (tx, rx) = mpsc::channel();
    run_scan(
        &fetcher,
        &tickers(&["A", "B"]),
        &options(),
        &ChannelProgress::new(tx),
        None,
    )
    .unwrap();

    let events: Vec<ProgressEvent> = rx.try_iter().collect();
    assert_eq!(events.len(), 5);
    assert_eq!(
        events[0],
        ProgressEvent::Started {
            ticker: "A".into(),
            index: 0,
            total: 2
        }
    );
    assert!(matches!(
        &events[3],
        ProgressEvent::Completed {
            index: 1,
            outcome: TickerOutcome::FetchFailed(_),
            ..
        }
    ));
    match &events[4] {
        ProgressEvent::Finished(summary) => {
            assert_eq!(summary.matched, 1);
            assert_eq!(summary.failed, 1);
        }
        other => panic!("expected Finished, got {other:?}"),
    }
}

struct DownSource;

impl TickerSource for DownSource {
    fn name(&self) -> &str {
        "down"
    }

    fn fetch_tickers(&self) -> Result<Vec<String>, UniverseError> {
        Err(UniverseError::Http("503".into()))
    }
}

#[test]
fn empty_universe_halts_before_fetching() {
    let provider = MapProvider::new(vec![("A", Canned::Bars(rising()))]);
    let fetcher = PriceFetcher::new(provider.clone());
    let universe = UniverseProvider::new()
        .with_source(DownSource)
        .with_source(StaticSource::new("empty", Vec::<String>::new()));

    let err = scan_universe(&universe, &[], &fetcher, &options(), &NoProgress, None).unwrap_err();
    match err {
        ScanError::EmptyUniverse { warnings } => assert_eq!(warnings.len(), 2),
        other => panic!("expected EmptyUniverse, got {other:?}"),
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn universe_scan_carries_source_warnings() {
    let provider = MapProvider::new(vec![
        ("A", Canned::Bars(rising())),
        ("B", Canned::Bars(flat())),
    ]);
    let fetcher = PriceFetcher::new(provider);
    let universe = UniverseProvider::new()
        .with_source(DownSource)
        .with_source(StaticSource::new("static", ["B", "A"]));

    let report =
        scan_universe(&universe, &[], &fetcher, &options(), &NoProgress, None).unwrap();
    assert_eq!(report.summary.processed, 2);
    assert_eq!(report.results[0].ticker, "A");
    assert_eq!(report.universe_warnings.len(), 1);
    assert_eq!(report.universe_warnings[0].source, "down");
}

#[test]
fn explicit_subset_skips_universe_sources() {
    let provider = MapProvider::new(vec![("A", Canned::Bars(rising()))]);
    let fetcher = PriceFetcher::new(provider);
    let universe = UniverseProvider::new().with_source(DownSource);

    let report = scan_universe(
        &universe,
        &tickers(&[" A", "A"]),
        &fetcher,
        &options(),
        &NoProgress,
        None,
    )
    .unwrap();
    assert_eq!(report.summary.total, 1);
    assert_eq!(report.results.len(), 1);
    assert!(report.universe_warnings.is_empty());
}

#[test]
fn csv_export_of_scan() {
    let provider = MapProvider::new(vec![
        ("A", Canned::Bars(rising())),
        ("B", Canned::Bars(flat())),
    ]);
    let fetcher = PriceFetcher::new(provider);
    let report =
        run_scan(&fetcher, &tickers(&["A", "B"]), &options(), &NoProgress, None).unwrap();

    let csv = export_results_csv(&report.results).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "ticker,date,close,sma_short,sma_long,rolling_high,aroc,entry_recommendation,sell_recommendation"
    );
    assert!(lines[1].starts_with("A,2024-06-28,120,"));
}
