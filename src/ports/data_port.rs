//! Market data, fundamentals and price lookup ports.
//!
//! Implementations supply already-retrieved data; the core neither retries
//! nor caches.

use crate::domain::error::MarketScoreError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::ohlcv::BarSeries;
use chrono::NaiveDate;

pub trait MarketDataPort: Send + Sync {
    /// Bars for `symbol` within `[start_date, end_date]`. An empty series
    /// means no data for the symbol or range.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BarSeries, MarketScoreError>;
}

pub trait FundamentalsPort: Send + Sync {
    /// `Ok(None)` when no record exists for the symbol.
    fn fetch_fundamentals(&self, symbol: &str) -> Result<Option<Fundamentals>, MarketScoreError>;
}

pub trait PriceLookupPort: Send + Sync {
    fn latest_price(&self, symbol: &str) -> Result<f64, MarketScoreError>;
}
