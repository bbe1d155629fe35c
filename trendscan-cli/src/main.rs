//! TrendScan CLI — scan the S&P 500 / Nasdaq-100 universe for trend entries.
//!
//! Commands:
//! - `scan` — fetch prices, evaluate the entry rule, print and save matches
//! - `universe` — list the deduplicated ticker universe

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use trendscan_core::data::UniverseFile;
use trendscan_core::domain::ScanResult;
use trendscan_runner::{
    export_results_csv, export_results_json, save_results, scan_universe, ConsoleProgress,
    ScanConfig, ScanError, ScanOptions, DEFAULT_OUTPUT_FILE,
};

/// Exit status when there is nothing to scan.
const EXIT_EMPTY_UNIVERSE: u8 = 2;

/// List name used by `universe --save`.
const SNAPSHOT_LIST: &str = "universe";

#[derive(Parser)]
#[command(
    name = "trendscan",
    about = "TrendScan CLI — momentum screen over S&P 500 and Nasdaq-100"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the universe (or --tickers) and report every entry signal.
    Scan {
        /// Comma-separated tickers to scan instead of the full universe.
        #[arg(long, value_delimiter = ',')]
        tickers: Vec<String>,

        /// Short moving-average window [5, 100].
        #[arg(long)]
        sma_short: Option<usize>,

        /// Long moving-average window [10, 200].
        #[arg(long)]
        sma_long: Option<usize>,

        /// Rate-of-change lookback in weeks [4, 52].
        #[arg(long)]
        aroc_weeks: Option<usize>,

        /// Last date of the price window (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// TOML config file. Command-line flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Extra TOML file of named ticker lists.
        #[arg(long)]
        universe_file: Option<PathBuf>,

        /// Read `{dir}/{TICKER}.csv` instead of calling Yahoo Finance.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Worker threads for fetching and evaluation.
        #[arg(long)]
        threads: Option<usize>,

        /// Where to save results (.json for JSON, CSV otherwise).
        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        /// How to print results on stdout.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Print the ticker universe, one symbol per line.
    Universe {
        /// TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Extra TOML file of named ticker lists.
        #[arg(long)]
        universe_file: Option<PathBuf>,

        /// Also write the listing as a universe file, reusable with --universe-file.
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Scan {
            tickers,
            sma_short,
            sma_long,
            aroc_weeks,
            as_of,
            config,
            universe_file,
            data_dir,
            threads,
            output,
            format,
        } => {
            let overrides = ScanOverrides {
                tickers,
                sma_short,
                sma_long,
                aroc_weeks,
                universe_file,
                data_dir,
                threads,
            };
            run_scan_cmd(config, overrides, as_of, output, format)
        }
        Commands::Universe {
            config,
            universe_file,
            save,
        } => run_universe_cmd(config, universe_file, save),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Command-line values that take precedence over the config file.
struct ScanOverrides {
    tickers: Vec<String>,
    sma_short: Option<usize>,
    sma_long: Option<usize>,
    aroc_weeks: Option<usize>,
    universe_file: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    threads: Option<usize>,
}

impl ScanOverrides {
    fn apply(self, config: &mut ScanConfig) {
        let params = &mut config.scan.params;
        if let Some(v) = self.sma_short {
            params.sma_short_window = v;
        }
        if let Some(v) = self.sma_long {
            params.sma_long_window = v;
        }
        if let Some(v) = self.aroc_weeks {
            params.aroc_weeks = v;
        }
        if !self.tickers.is_empty() {
            config.scan.tickers = self.tickers;
        }
        if self.universe_file.is_some() {
            config.universe.file = self.universe_file;
        }
        if self.data_dir.is_some() {
            config.fetch.data_dir = self.data_dir;
        }
        if let Some(v) = self.threads {
            config.fetch.threads = v;
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn run_scan_cmd(
    config_path: Option<PathBuf>,
    overrides: ScanOverrides,
    as_of: Option<String>,
    output: PathBuf,
    format: OutputFormat,
) -> Result<ExitCode> {
    let mut config = load_config(config_path)?;
    overrides.apply(&mut config);
    config.validate()?;
    tracing::debug!(?config, "effective config");

    let as_of = as_of
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--as-of must be YYYY-MM-DD")?;

    let fetcher = config.fetch.build_fetcher()?;
    let universe = config.universe.build_provider(&config.fetch);
    let options = ScanOptions {
        params: config.scan.params,
        as_of,
        threads: config.fetch.threads,
        ..Default::default()
    };

    let report = match scan_universe(
        &universe,
        &config.scan.tickers,
        &fetcher,
        &options,
        &ConsoleProgress,
        None,
    ) {
        Ok(report) => report,
        Err(ScanError::EmptyUniverse { warnings }) => {
            for w in &warnings {
                eprintln!("  {}: {}", w.source, w.message);
            }
            eprintln!("Error: no tickers to scan; every universe source failed or was empty");
            return Ok(ExitCode::from(EXIT_EMPTY_UNIVERSE));
        }
        Err(e) => return Err(e.into()),
    };

    for w in &report.universe_warnings {
        eprintln!("Warning: universe source {} unavailable: {}", w.source, w.message);
    }

    print_results(&report.results, format)?;

    let path = save_results(&report.results, &output)?;
    eprintln!("Results saved to: {}", path.display());

    Ok(ExitCode::SUCCESS)
}

fn run_universe_cmd(
    config_path: Option<PathBuf>,
    universe_file: Option<PathBuf>,
    save: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut config = load_config(config_path)?;
    if universe_file.is_some() {
        config.universe.file = universe_file;
    }

    let listing = config
        .universe
        .build_provider(&config.fetch)
        .list_universe();
    for w in &listing.warnings {
        eprintln!("Warning: universe source {} unavailable: {}", w.source, w.message);
    }
    if listing.is_empty() {
        eprintln!("Error: ticker universe is empty");
        return Ok(ExitCode::from(EXIT_EMPTY_UNIVERSE));
    }

    for ticker in &listing.tickers {
        println!("{ticker}");
    }
    eprintln!("{} tickers", listing.len());

    if let Some(path) = save {
        std::fs::write(&path, universe_snapshot(&listing.tickers)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Universe saved to: {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// The listing as a one-list universe file.
fn universe_snapshot(tickers: &[String]) -> Result<String> {
    let mut file = UniverseFile::default();
    file.lists.insert(SNAPSHOT_LIST.to_string(), tickers.to_vec());
    Ok(file.to_toml()?)
}

fn print_results(results: &[ScanResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_table(results),
        OutputFormat::Csv => print!("{}", export_results_csv(results)?),
        OutputFormat::Json => println!("{}", export_results_json(results)?),
    }
    Ok(())
}

fn print_table(results: &[ScanResult]) {
    if results.is_empty() {
        return;
    }
    println!(
        "{:<8} {:<10} {:>10} {:>10} {:>10} {:>10} {:>8} {:>10} {:>10}",
        "Ticker", "Date", "Close", "SMA short", "SMA long", "High", "AROC %", "Entry", "Sell"
    );
    for r in results {
        println!(
            "{:<8} {:<10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>8.2} {:>10.2} {:>10.2}",
            r.ticker,
            r.date.to_string(),
            r.close,
            r.sma_short,
            r.sma_long,
            r.rolling_high,
            r.aroc,
            r.entry_recommendation,
            r.sell_recommendation,
        );
    }
}
