//! Price history and market data providers
//!
//! The engine never talks to a market data transport directly. It goes
//! through [`MarketDataProvider`], for which this module ships a CSV-backed
//! and an in-memory implementation.

use crate::error::{ForecastError, Result};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Single closing price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing price
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Ordered closing prices for one symbol
///
/// Dates are strictly increasing and every close is finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistory {
    points: Vec<PricePoint>,
}

impl PriceHistory {
    /// Create a price history, validating ordering and prices
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::InvalidData(format!(
                    "Dates must be strictly increasing: {} follows {}",
                    pair[1].date, pair[0].date
                )));
            }
        }

        if let Some(bad) = points
            .iter()
            .find(|p| !p.close.is_finite() || p.close <= 0.0)
        {
            return Err(ForecastError::InvalidData(format!(
                "Invalid close {} on {}",
                bad.close, bad.date
            )));
        }

        Ok(Self { points })
    }

    /// Create a history from closes on consecutive calendar days starting at `start`
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let points = closes
            .iter()
            .zip(start.iter_days())
            .map(|(&close, date)| PricePoint::new(date, close))
            .collect();

        Self::new(points)
    }

    /// Get the observations
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Get the close prices as a vector
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Get the dates as a vector
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Most recent observation
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Restrict the history to `period` before its last date
    pub fn trailing(&self, period: HistoryPeriod) -> Self {
        let (Some(last), Some(months)) = (self.last(), period.months()) else {
            return self.clone();
        };

        match last.date.checked_sub_months(Months::new(months)) {
            Some(cutoff) => Self {
                points: self
                    .points
                    .iter()
                    .filter(|p| p.date > cutoff)
                    .copied()
                    .collect(),
            },
            None => self.clone(),
        }
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the length of the history
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Look-back period requested from a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPeriod {
    /// The last `n` years before the most recent observation
    Years(u32),
    /// Everything the provider has
    Max,
}

impl HistoryPeriod {
    fn months(&self) -> Option<u32> {
        match self {
            HistoryPeriod::Years(years) => Some(years.saturating_mul(12)),
            HistoryPeriod::Max => None,
        }
    }
}

impl Default for HistoryPeriod {
    fn default() -> Self {
        HistoryPeriod::Years(5)
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryPeriod::Years(years) => write!(f, "{}y", years),
            HistoryPeriod::Max => write!(f, "max"),
        }
    }
}

/// Price-to-book used when the provider does not report one
pub const DEFAULT_PRICE_TO_BOOK: f64 = 1.0;

/// Fundamental ratios reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    /// Price-to-book ratio, if known
    pub price_to_book: Option<f64>,
}

impl Fundamentals {
    pub fn with_price_to_book(price_to_book: f64) -> Self {
        Self {
            price_to_book: Some(price_to_book),
        }
    }

    /// Price-to-book, falling back to [`DEFAULT_PRICE_TO_BOOK`]
    pub fn price_to_book(&self) -> f64 {
        self.price_to_book
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_PRICE_TO_BOOK)
    }
}

/// Source of price history and fundamentals
pub trait MarketDataProvider {
    /// Fetch the closing price history of `symbol` over `period`
    fn fetch_history(&self, symbol: &str, period: HistoryPeriod) -> Result<PriceHistory>;

    /// Fetch fundamental ratios of `symbol`
    fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals>;
}

/// Provider backed by in-memory data, mostly for tests and demos
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    histories: HashMap<String, PriceHistory>,
    fundamentals: HashMap<String, Fundamentals>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the history of a symbol
    pub fn with_history(mut self, symbol: &str, history: PriceHistory) -> Self {
        self.insert_history(symbol, history);
        self
    }

    /// Register (or replace) the fundamentals of a symbol
    pub fn with_fundamentals(mut self, symbol: &str, fundamentals: Fundamentals) -> Self {
        self.fundamentals.insert(symbol.to_string(), fundamentals);
        self
    }

    pub fn insert_history(&mut self, symbol: &str, history: PriceHistory) {
        self.histories.insert(symbol.to_string(), history);
    }

    pub fn remove_history(&mut self, symbol: &str) -> Option<PriceHistory> {
        self.histories.remove(symbol)
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn fetch_history(&self, symbol: &str, period: HistoryPeriod) -> Result<PriceHistory> {
        match self.histories.get(symbol) {
            Some(history) if !history.is_empty() => Ok(history.trailing(period)),
            Some(_) => Err(ForecastError::DataUnavailable(format!(
                "Empty price history for {}",
                symbol
            ))),
            None => Err(ForecastError::DataUnavailable(format!(
                "Unknown symbol {}",
                symbol
            ))),
        }
    }

    fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        Ok(self.fundamentals.get(symbol).copied().unwrap_or_default())
    }
}

/// File holding `symbol,price_to_book` rows inside a [`CsvProvider`] directory
pub const FUNDAMENTALS_FILE: &str = "fundamentals.csv";

/// Provider reading `<dir>/<SYMBOL>.csv` files
///
/// Each file needs a date column (`date`, `datetime`, `timestamp` or `time`)
/// and a close column (`close`, `adj close` or `price`); other columns are
/// ignored. Rows with an empty close are skipped.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the CSV files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn history_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }

    /// Load a full price history from a CSV file
    pub fn load_history<P: AsRef<Path>>(path: P) -> Result<PriceHistory> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader.headers()?.clone();
        let date_idx = detect_column(&headers, &["date", "datetime", "timestamp", "time"])
            .ok_or_else(|| ForecastError::InvalidData("No date column found".to_string()))?;
        let close_idx = detect_column(&headers, &["close", "adj close", "price"])
            .ok_or_else(|| ForecastError::InvalidData("No close column found".to_string()))?;

        let mut points = Vec::new();
        for record in reader.records() {
            let record = record?;
            let close = match record.get(close_idx).map(str::trim) {
                Some("") | None => continue,
                Some(raw) => raw.parse::<f64>().map_err(|_| {
                    ForecastError::InvalidData(format!("Invalid close value '{}'", raw))
                })?,
            };
            let date = parse_date(record.get(date_idx).unwrap_or_default())?;
            points.push(PricePoint::new(date, close));
        }

        points.sort_by_key(|p| p.date);
        PriceHistory::new(points)
    }

    fn load_fundamentals(&self) -> Result<HashMap<String, Fundamentals>> {
        let path = self.dir.join(FUNDAMENTALS_FILE);
        let mut table = HashMap::new();
        if !path.exists() {
            return Ok(table);
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let symbol_idx = detect_column(&headers, &["symbol", "ticker"]).ok_or_else(|| {
            ForecastError::InvalidData("No symbol column in fundamentals".to_string())
        })?;
        let pb_idx = detect_column(&headers, &["price_to_book", "pricetobook", "p/b", "p/vp"]);

        for record in reader.records() {
            let record = record?;
            let Some(symbol) = record.get(symbol_idx).map(str::trim) else {
                continue;
            };
            let price_to_book = pb_idx
                .and_then(|idx| record.get(idx))
                .and_then(|raw| raw.trim().parse::<f64>().ok());
            table.insert(symbol.to_string(), Fundamentals { price_to_book });
        }

        Ok(table)
    }
}

impl MarketDataProvider for CsvProvider {
    fn fetch_history(&self, symbol: &str, period: HistoryPeriod) -> Result<PriceHistory> {
        let path = self.history_path(symbol);
        if !path.exists() {
            return Err(ForecastError::DataUnavailable(format!(
                "No data file for {} at {}",
                symbol,
                path.display()
            )));
        }

        let history =
            Self::load_history(&path).map_err(|e| ForecastError::provider(symbol, e))?;
        if history.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "Empty price history for {}",
                symbol
            )));
        }

        Ok(history.trailing(period))
    }

    fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let table = self
            .load_fundamentals()
            .map_err(|e| ForecastError::provider(symbol, e))?;
        Ok(table.get(symbol).copied().unwrap_or_default())
    }
}

fn detect_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.contains(&h.trim().to_lowercase().as_str()))
}

/// Parse a date, accepting plain `YYYY-MM-DD` or any timestamp starting with one
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            raw.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
        .ok_or_else(|| ForecastError::InvalidData(format!("Invalid date '{}'", raw)))
}
