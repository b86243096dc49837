#![allow(dead_code)]

use chrono::NaiveDate;
use marketscore::domain::error::MarketScoreError;
use marketscore::domain::evaluation::EvaluationConfig;
use marketscore::domain::fundamentals::Fundamentals;
use marketscore::domain::indicator::set::IndicatorParams;
pub use marketscore::domain::ohlcv::{Bar, BarSeries};
use marketscore::domain::recommendation::Recommendation;
use marketscore::domain::scoring::ScoringPolicy;
use marketscore::ports::alert_port::AlertSink;
use marketscore::ports::data_port::{FundamentalsPort, MarketDataPort, PriceLookupPort};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Bars per symbol. A symbol with a scripted queue serves the next queued
/// series on each fetch, then keeps serving the last one.
#[derive(Default)]
pub struct MockMarketData {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub scripted: Mutex<HashMap<String, VecDeque<Vec<Bar>>>>,
    pub fetches: Mutex<Vec<String>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn with_script(self, symbol: &str, cycles: Vec<Vec<Bar>>) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .insert(symbol.to_string(), cycles.into());
        self
    }

    pub fn fetch_count(&self, symbol: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.as_str() == symbol)
            .count()
    }

    fn bars_for(&self, symbol: &str) -> Vec<Bar> {
        let mut scripted = self.scripted.lock().unwrap();
        if let Some(queue) = scripted.get_mut(symbol) {
            if queue.len() > 1 {
                return queue.pop_front().unwrap();
            }
            if let Some(last) = queue.front() {
                return last.clone();
            }
        }
        self.data.get(symbol).cloned().unwrap_or_default()
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_bars(
        &self,
        symbol: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<BarSeries, MarketScoreError> {
        self.fetches.lock().unwrap().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MarketScoreError::MarketData {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        BarSeries::new(symbol, self.bars_for(symbol)).map_err(|source| {
            MarketScoreError::InvalidBars {
                symbol: symbol.to_string(),
                source,
            }
        })
    }
}

#[derive(Default)]
pub struct MockFundamentals {
    pub data: HashMap<String, Fundamentals>,
}

impl MockFundamentals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, fundamentals: Fundamentals) -> Self {
        self.data.insert(symbol.to_string(), fundamentals);
        self
    }
}

impl FundamentalsPort for MockFundamentals {
    fn fetch_fundamentals(&self, symbol: &str) -> Result<Option<Fundamentals>, MarketScoreError> {
        Ok(self.data.get(symbol).cloned())
    }
}

#[derive(Default)]
pub struct MockPrices {
    pub prices: HashMap<String, f64>,
}

impl MockPrices {
    pub fn with(mut self, symbol: &str, price: f64) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }
}

impl PriceLookupPort for MockPrices {
    fn latest_price(&self, symbol: &str) -> Result<f64, MarketScoreError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| MarketScoreError::PriceLookup {
                symbol: symbol.to_string(),
                reason: "not quoted".to_string(),
            })
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub alerts: Mutex<Vec<(String, Recommendation, String)>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }

    pub fn for_symbol(&self, symbol: &str) -> Vec<Recommendation> {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _, _)| s == symbol)
            .map(|(_, r, _)| *r)
            .collect()
    }
}

impl AlertSink for RecordingSink {
    fn emit_alert(
        &self,
        symbol: &str,
        recommendation: Recommendation,
        message: &str,
    ) -> Result<(), MarketScoreError> {
        self.alerts.lock().unwrap().push((
            symbol.to_string(),
            recommendation,
            message.to_string(),
        ));
        Ok(())
    }
}

pub struct FailingSink;

impl AlertSink for FailingSink {
    fn emit_alert(
        &self,
        _symbol: &str,
        _recommendation: Recommendation,
        _message: &str,
    ) -> Result<(), MarketScoreError> {
        Err(MarketScoreError::AlertSink {
            reason: "notification service down".to_string(),
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars from the given closes. Each bar opens at the previous close
/// and has no shadows, so no candlestick pattern fires on a monotonic run.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<Bar> {
    let mut prev = closes.first().copied().unwrap_or_default();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = prev;
            prev = close;
            Bar {
                date: start + chrono::Duration::days(i as i64),
                open,
                high: open.max(close),
                low: open.min(close),
                close,
                volume: Some(1000),
            }
        })
        .collect()
}

/// Accelerating uptrend: RSI 100, fast EMA above slow, MACD above signal.
pub fn rising_bars(count: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| 100.0 + 0.005 * (i * i) as f64)
        .collect();
    bars_from_closes(date(2023, 1, 2), &closes)
}

/// Accelerating downtrend: RSI 0, fast EMA below slow, MACD below signal.
pub fn falling_bars(count: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..count)
        .map(|i| 400.0 - 0.005 * (i * i) as f64)
        .collect();
    bars_from_closes(date(2023, 1, 2), &closes)
}

pub fn value_fundamentals() -> Fundamentals {
    Fundamentals {
        name: Some("Tata Consultancy Services".into()),
        sector: Some("Technology".into()),
        industry: Some("IT Services".into()),
        pe_ratio: Some(15.0),
        ..Fundamentals::default()
    }
}

pub fn eval_config(policy: ScoringPolicy) -> EvaluationConfig {
    EvaluationConfig {
        start_date: date(2023, 1, 1),
        end_date: date(2024, 12, 31),
        policy,
        indicators: IndicatorParams::default(),
    }
}
