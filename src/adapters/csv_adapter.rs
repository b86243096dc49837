//! CSV file adapters for bars, fundamentals and holdings.
//!
//! Bars live one file per symbol at `<bars_dir>/<SYMBOL>.csv` with header
//! `date,open,high,low,close,volume`. Fundamentals are a single file keyed by
//! `symbol`. Holdings use the `Symbol,Quantity` upload layout.

use crate::domain::error::MarketScoreError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::ohlcv::{Bar, BarSeries};
use crate::domain::portfolio::Holding;
use crate::ports::data_port::{FundamentalsPort, MarketDataPort, PriceLookupPort};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct BarRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FundamentalsRecord {
    symbol: String,
    name: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    pe: Option<f64>,
    pb: Option<f64>,
    roe_pct: Option<f64>,
    dividend_yield_pct: Option<f64>,
    market_cap: Option<f64>,
    debt_to_equity: Option<f64>,
}

impl From<FundamentalsRecord> for Fundamentals {
    fn from(r: FundamentalsRecord) -> Self {
        let text = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Fundamentals {
            name: text(r.name),
            sector: text(r.sector),
            industry: text(r.industry),
            pe_ratio: r.pe,
            price_to_book: r.pb,
            roe_pct: r.roe_pct,
            dividend_yield_pct: r.dividend_yield_pct,
            market_cap: r.market_cap,
            debt_to_equity: r.debt_to_equity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HoldingRecord {
    #[serde(rename = "Symbol", alias = "symbol")]
    symbol: String,
    #[serde(rename = "Quantity", alias = "quantity")]
    quantity: f64,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input)
}

pub struct CsvMarketData {
    bars_dir: PathBuf,
}

impl CsvMarketData {
    pub fn new(bars_dir: PathBuf) -> Self {
        Self { bars_dir }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.bars_dir.join(format!("{}.csv", symbol))
    }

    /// All bars in the symbol's file, optionally limited to a date range.
    fn load(
        &self,
        symbol: &str,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<BarSeries, MarketScoreError> {
        let path = self.csv_path(symbol);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(symbol, path = %path.display(), "no bar file");
                return Ok(BarSeries::empty(symbol));
            }
            Err(e) => {
                return Err(MarketScoreError::MarketData {
                    symbol: symbol.to_string(),
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let data_err = |reason: String| MarketScoreError::MarketData {
            symbol: symbol.to_string(),
            reason,
        };

        let mut bars = Vec::new();
        for (line, result) in reader(file).deserialize::<BarRecord>().enumerate() {
            let record = result.map_err(|e| data_err(format!("CSV parse error: {}", e)))?;
            let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").map_err(|e| {
                data_err(format!("invalid date '{}' on row {}: {}", record.date, line + 1, e))
            })?;
            if let Some((start, end)) = range {
                if date < start || date > end {
                    continue;
                }
            }
            bars.push(Bar {
                date,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        BarSeries::new(symbol, bars).map_err(|source| MarketScoreError::InvalidBars {
            symbol: symbol.to_string(),
            source,
        })
    }
}

impl MarketDataPort for CsvMarketData {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BarSeries, MarketScoreError> {
        self.load(symbol, Some((start_date, end_date)))
    }
}

impl PriceLookupPort for CsvMarketData {
    fn latest_price(&self, symbol: &str) -> Result<f64, MarketScoreError> {
        let series = self.load(symbol, None).map_err(|e| MarketScoreError::PriceLookup {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;
        series
            .last()
            .map(|b| b.close)
            .ok_or_else(|| MarketScoreError::PriceLookup {
                symbol: symbol.to_string(),
                reason: "no price data".to_string(),
            })
    }
}

/// Fundamentals loaded once from a CSV file and served from memory.
#[derive(Debug, Default)]
pub struct CsvFundamentals {
    records: HashMap<String, Fundamentals>,
}

impl CsvFundamentals {
    pub fn from_path(path: &Path) -> Result<Self, MarketScoreError> {
        let file = File::open(path).map_err(|e| MarketScoreError::Fundamentals {
            symbol: "*".to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(input: R) -> Result<Self, MarketScoreError> {
        let mut records = HashMap::new();
        for result in reader(input).deserialize::<FundamentalsRecord>() {
            let record = result.map_err(|e| MarketScoreError::Fundamentals {
                symbol: "*".to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;
            records.insert(record.symbol.to_uppercase(), Fundamentals::from(record));
        }
        tracing::debug!(count = records.len(), "loaded fundamentals");
        Ok(Self { records })
    }

    /// A source with no records, for policies that never read fundamentals.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FundamentalsPort for CsvFundamentals {
    fn fetch_fundamentals(&self, symbol: &str) -> Result<Option<Fundamentals>, MarketScoreError> {
        Ok(self.records.get(&symbol.to_uppercase()).cloned())
    }
}

pub fn read_holdings(path: &Path) -> Result<Vec<Holding>, MarketScoreError> {
    let holdings_err = |reason: String| MarketScoreError::Holdings {
        file: path.display().to_string(),
        reason,
    };
    let file = File::open(path).map_err(|e| holdings_err(e.to_string()))?;

    reader(file)
        .deserialize::<HoldingRecord>()
        .map(|result| {
            result
                .map(|r| Holding::new(r.symbol.to_uppercase(), r.quantity))
                .map_err(|e| holdings_err(format!("CSV parse error: {}", e)))
        })
        .collect()
}
