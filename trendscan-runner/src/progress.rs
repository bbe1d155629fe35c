//! Progress observers for a scan.
//!
//! With `threads > 1` the callbacks arrive from worker threads in completion
//! order; `index` is always the ticker's position in the input list.

use std::sync::mpsc::Sender;

use crate::scanner::{ScanSummary, TickerOutcome};

/// Progress callback for a multi-ticker scan.
pub trait ScanProgress: Send + Sync {
    /// Called before a ticker is fetched.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called once the ticker has been classified.
    fn on_complete(&self, ticker: &str, index: usize, total: usize, outcome: &TickerOutcome);

    /// Called once, after the last ticker (or after cancellation).
    fn on_scan_complete(&self, summary: &ScanSummary);
}

/// Discards every event.
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}

    fn on_complete(&self, _ticker: &str, _index: usize, _total: usize, _outcome: &TickerOutcome) {}

    fn on_scan_complete(&self, _summary: &ScanSummary) {}
}

/// Human-readable progress on stderr, leaving stdout for results.
pub struct ConsoleProgress;

impl ScanProgress for ConsoleProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        eprintln!("Analyzing {ticker} ({}/{total})...", index + 1);
    }

    fn on_complete(&self, ticker: &str, _index: usize, _total: usize, outcome: &TickerOutcome) {
        if let TickerOutcome::FetchFailed(reason) = outcome {
            eprintln!("  skipped {ticker}: {reason}");
        }
    }

    fn on_scan_complete(&self, summary: &ScanSummary) {
        if summary.cancelled {
            eprintln!(
                "Scan cancelled after {}/{} tickers.",
                summary.processed, summary.total
            );
        }
        if summary.matched == 0 {
            eprintln!("No tickers matched the criteria.");
        } else {
            eprintln!("Found {} matching tickers.", summary.matched);
        }
    }
}

/// A progress event as plain data, for presentation layers that poll.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started {
        ticker: String,
        index: usize,
        total: usize,
    },
    Completed {
        ticker: String,
        index: usize,
        total: usize,
        outcome: TickerOutcome,
    },
    Finished(ScanSummary),
}

/// Forwards events over a channel. A dropped receiver is ignored.
pub struct ChannelProgress {
    tx: Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ScanProgress for ChannelProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        let _ = self.tx.send(ProgressEvent::Started {
            ticker: ticker.to_string(),
            index,
            total,
        });
    }

    fn on_complete(&self, ticker: &str, index: usize, total: usize, outcome: &TickerOutcome) {
        let _ = self.tx.send(ProgressEvent::Completed {
            ticker: ticker.to_string(),
            index,
            total,
            outcome: outcome.clone(),
        });
    }

    fn on_scan_complete(&self, summary: &ScanSummary) {
        let _ = self.tx.send(ProgressEvent::Finished(summary.clone()));
    }
}
