//! Index-constituent ticker sources scraped from Wikipedia tables.

use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use super::universe::{TickerSource, UniverseError};

pub const SP500_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";
pub const NASDAQ100_URL: &str = "https://en.wikipedia.org/wiki/Nasdaq-100";

/// How to pick the table and the symbol column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableMatch {
    /// The first table on the page; header text must equal one of the names.
    FirstTable { column: Vec<String> },
    /// The first table having a header that contains one of the needles.
    AnyTable { column_contains: Vec<String> },
}

pub struct WikipediaSource {
    name: String,
    url: String,
    table: TableMatch,
    timeout: Duration,
}

impl WikipediaSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>, table: TableMatch) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            table,
            timeout: Duration::from_secs(30),
        }
    }

    /// S&P 500 constituents: first table, `Symbol` column.
    pub fn sp500() -> Self {
        Self::new(
            "sp500",
            SP500_URL,
            TableMatch::FirstTable {
                column: vec!["Symbol".into()],
            },
        )
    }

    /// Nasdaq-100 components: first table with a `Ticker` or `Symbol` header.
    pub fn nasdaq100() -> Self {
        Self::new(
            "nasdaq100",
            NASDAQ100_URL,
            TableMatch::AnyTable {
                column_contains: vec!["Ticker".into(), "Symbol".into()],
            },
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_html(&self) -> Result<String, UniverseError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent("trendscan/0.1 (constituent list reader)")
            .build()
            .map_err(|e| UniverseError::Http(e.to_string()))?;

        let resp = client
            .get(&self.url)
            .send()
            .map_err(|e| UniverseError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UniverseError::Http(format!("HTTP {status} for {}", self.url)));
        }

        resp.text().map_err(|e| UniverseError::Http(e.to_string()))
    }
}

impl TickerSource for WikipediaSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_tickers(&self) -> Result<Vec<String>, UniverseError> {
        let html = self.fetch_html()?;
        parse_ticker_table(&html, &self.table)
    }
}

fn selector(css: &str) -> Result<Selector, UniverseError> {
    Selector::parse(css).map_err(|e| UniverseError::Parse(format!("selector {css}: {e}")))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Extract the symbol column from the table chosen by `table`.
///
/// The first row is the header. Data rows shorter than the symbol column are
/// skipped. Empty cells are skipped.
pub fn parse_ticker_table(html: &str, table: &TableMatch) -> Result<Vec<String>, UniverseError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;

    let matches_header = |header: &str| match table {
        TableMatch::FirstTable { column } => column.iter().any(|c| c.as_str() == header),
        TableMatch::AnyTable { column_contains } => {
            column_contains.iter().any(|c| header.contains(c.as_str()))
        }
    };

    let candidates: Vec<ElementRef<'_>> = match table {
        TableMatch::FirstTable { .. } => document.select(&table_sel).take(1).collect(),
        TableMatch::AnyTable { .. } => document.select(&table_sel).collect(),
    };
    if candidates.is_empty() {
        return Err(UniverseError::TableNotFound("any table".into()));
    }

    for candidate in candidates {
        let mut rows = candidate.select(&row_sel);
        let Some(header_row) = rows.next() else {
            continue;
        };
        let column = header_row
            .select(&cell_sel)
            .map(cell_text)
            .position(|h| matches_header(&h));

        let Some(column) = column else {
            continue;
        };

        let tickers = rows
            .filter_map(|row| row.select(&cell_sel).nth(column).map(cell_text))
            .filter(|t| !t.is_empty())
            .collect();
        return Ok(tickers);
    }

    Err(UniverseError::ColumnNotFound(format!("{table:?}")))
}
