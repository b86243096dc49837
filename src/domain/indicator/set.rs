//! Latest-bar indicator readings for one evaluation cycle.

use std::collections::HashMap;

use crate::domain::indicator::candlestick::{self, CandlePattern};
use crate::domain::indicator::{
    IndicatorType, IndicatorValue, MacdReading, calculate_ema, calculate_macd, calculate_rsi,
    calculate_sma, macd, rsi,
};
use crate::domain::ohlcv::BarSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub trend_fast: usize,
    pub trend_slow: usize,
    /// SMA/EMA period shown alongside price in the technicals table.
    pub overlay_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: rsi::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            trend_fast: 50,
            trend_slow: 200,
            overlay_period: 20,
        }
    }
}

impl IndicatorParams {
    pub fn rsi_type(&self) -> IndicatorType {
        IndicatorType::Rsi(self.rsi_period)
    }

    pub fn macd_type(&self) -> IndicatorType {
        IndicatorType::Macd {
            fast: self.macd_fast,
            slow: self.macd_slow,
            signal: self.macd_signal,
        }
    }

    /// Every indicator the scoring rules and technicals table read.
    pub fn required(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Ema(self.trend_fast),
            IndicatorType::Ema(self.trend_slow),
            IndicatorType::Sma(self.overlay_period),
            IndicatorType::Ema(self.overlay_period),
            self.rsi_type(),
            self.macd_type(),
        ]
    }
}

/// Indicator values at the last bar. Missing and indeterminate readings are
/// both `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    values: HashMap<IndicatorType, Option<IndicatorValue>>,
    patterns: HashMap<CandlePattern, Option<i32>>,
}

impl IndicatorSet {
    pub fn compute(series: &BarSeries, params: &IndicatorParams) -> Self {
        let bars = series.bars();
        let mut set = IndicatorSet::default();

        for indicator in params.required() {
            let latest = match indicator {
                IndicatorType::Sma(p) => calculate_sma(bars, p).latest(),
                IndicatorType::Ema(p) => calculate_ema(bars, p).latest(),
                IndicatorType::Rsi(p) => calculate_rsi(bars, p).latest(),
                IndicatorType::Macd { fast, slow, signal } => {
                    calculate_macd(bars, fast, slow, signal).latest()
                }
            };
            set.values.insert(indicator, latest);
        }
        for pattern in CandlePattern::ALL {
            set.patterns.insert(pattern, pattern.detect(bars));
        }
        set
    }

    pub fn with_value(mut self, indicator: IndicatorType, value: Option<IndicatorValue>) -> Self {
        self.values.insert(indicator, value);
        self
    }

    pub fn with_pattern(mut self, pattern: CandlePattern, flag: Option<i32>) -> Self {
        self.patterns.insert(pattern, flag);
        self
    }

    pub fn get(&self, indicator: IndicatorType) -> Option<IndicatorValue> {
        self.values.get(&indicator).copied().flatten()
    }

    pub fn sma(&self, period: usize) -> Option<f64> {
        self.get(IndicatorType::Sma(period)).and_then(|v| v.as_simple())
    }

    pub fn ema(&self, period: usize) -> Option<f64> {
        self.get(IndicatorType::Ema(period)).and_then(|v| v.as_simple())
    }

    pub fn rsi(&self, period: usize) -> Option<f64> {
        self.get(IndicatorType::Rsi(period)).and_then(|v| v.as_simple())
    }

    pub fn macd(&self, fast: usize, slow: usize, signal: usize) -> Option<MacdReading> {
        self.get(IndicatorType::Macd { fast, slow, signal })
            .and_then(|v| v.as_macd())
    }

    pub fn pattern(&self, pattern: CandlePattern) -> Option<i32> {
        self.patterns.get(&pattern).copied().flatten()
    }

    /// Hammer, or a bullish engulfing, on the last bar.
    pub fn bullish_pattern(&self) -> Option<bool> {
        let hammer = self.pattern(CandlePattern::Hammer);
        let engulfing = self.pattern(CandlePattern::Engulfing);
        match (hammer, engulfing) {
            (None, None) => None,
            (h, e) => Some(
                h.is_some_and(|f| f != candlestick::NONE)
                    || e.is_some_and(|f| f == candlestick::BULLISH),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    fn series(prices: &[f64]) -> BarSeries {
        BarSeries::new("TEST", make_bars(prices)).unwrap()
    }

    #[test]
    fn default_params() {
        let p = IndicatorParams::default();
        assert_eq!(p.rsi_period, 14);
        assert_eq!((p.macd_fast, p.macd_slow, p.macd_signal), (12, 26, 9));
        assert_eq!((p.trend_fast, p.trend_slow), (50, 200));
        assert_eq!(p.overlay_period, 20);
    }

    #[test]
    fn short_history_leaves_long_indicators_indeterminate() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let set = IndicatorSet::compute(&series(&prices), &IndicatorParams::default());

        assert!(set.ema(50).is_some());
        assert_eq!(set.ema(200), None);
        assert_eq!(set.rsi(14), Some(100.0));
        assert!(set.macd(12, 26, 9).is_some());
        assert!(set.sma(20).is_some());
    }

    #[test]
    fn empty_series_is_all_indeterminate() {
        let set = IndicatorSet::compute(&BarSeries::empty("X"), &IndicatorParams::default());
        assert_eq!(set.ema(50), None);
        assert_eq!(set.rsi(14), None);
        assert_eq!(set.macd(12, 26, 9), None);
        assert_eq!(set.pattern(CandlePattern::Doji), None);
        assert_eq!(set.bullish_pattern(), None);
    }

    #[test]
    fn unrequested_indicator_is_none() {
        let set = IndicatorSet::compute(&series(&[1.0; 30]), &IndicatorParams::default());
        assert_eq!(set.ema(7), None);
    }

    #[test]
    fn bullish_pattern_from_engulfing() {
        let set = IndicatorSet::default()
            .with_pattern(CandlePattern::Hammer, Some(0))
            .with_pattern(CandlePattern::Engulfing, Some(candlestick::BULLISH));
        assert_eq!(set.bullish_pattern(), Some(true));

        let set = IndicatorSet::default()
            .with_pattern(CandlePattern::Hammer, Some(0))
            .with_pattern(CandlePattern::Engulfing, Some(candlestick::BEARISH));
        assert_eq!(set.bullish_pattern(), Some(false));
    }
}
