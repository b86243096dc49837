//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values
//!
//! A point whose value is `None` is indeterminate: the series did not yet
//! hold enough history for that indicator.

pub mod candlestick;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod set;
pub mod sma;
pub mod snapshot;

pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd(MacdReading),
}

impl IndicatorValue {
    pub fn as_simple(&self) -> Option<f64> {
        match self {
            IndicatorValue::Simple(v) => Some(*v),
            IndicatorValue::Macd(_) => None,
        }
    }

    pub fn as_macd(&self) -> Option<MacdReading> {
        match self {
            IndicatorValue::Macd(m) => Some(*m),
            IndicatorValue::Simple(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdReading {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn empty(indicator_type: IndicatorType) -> Self {
        Self {
            indicator_type,
            values: Vec::new(),
        }
    }

    /// Value at the last bar, or `None` if the series is empty or still warming up.
    pub fn latest(&self) -> Option<IndicatorValue> {
        self.values.last().and_then(|p| p.value)
    }

    pub fn latest_simple(&self) -> Option<f64> {
        self.latest().and_then(|v| v.as_simple())
    }

    pub fn simple_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .and_then(|p| p.value)
            .and_then(|v| v.as_simple())
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Ema(50), 1.0);
        map.insert(IndicatorType::Ema(200), 2.0);

        assert_eq!(map.get(&IndicatorType::Ema(50)), Some(&1.0));
        assert_eq!(map.get(&IndicatorType::Ema(200)), Some(&2.0));
        assert_eq!(map.get(&IndicatorType::Sma(50)), None);
    }

    #[test]
    fn latest_of_warming_series_is_none() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(3),
            values: vec![IndicatorPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                value: None,
            }],
        };
        assert_eq!(series.latest(), None);
        assert_eq!(series.latest_simple(), None);
    }

    #[test]
    fn value_accessors() {
        let m = MacdReading {
            line: 1.0,
            signal: 0.5,
            histogram: 0.5,
        };
        assert_eq!(IndicatorValue::Simple(3.0).as_simple(), Some(3.0));
        assert_eq!(IndicatorValue::Simple(3.0).as_macd(), None);
        assert_eq!(IndicatorValue::Macd(m).as_macd(), Some(m));
        assert_eq!(IndicatorValue::Macd(m).as_simple(), None);
    }
}
