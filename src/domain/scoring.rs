//! Composite scoring of fundamentals and indicator readings.
//!
//! Two policies exist and are selected explicitly by configuration:
//!
//! | rule                       | composite | momentum |
//! |----------------------------|-----------|----------|
//! | base                       | 50        | 0        |
//! | PE < 20                    | +10       |          |
//! | ROE > 15%                  | +10       |          |
//! | dividend yield > 2%        | +5        |          |
//! | RSI < 30                   | +5        | +15      |
//! | RSI > 70                   | -5        | -15      |
//! | EMA(fast) > EMA(slow)      | +10       |          |
//! | MACD > signal              | +10       | +20      |
//! | MACD <= signal             |           | -10      |
//! | bullish candle             | +2        |          |
//! | doji                       | +1        |          |
//!
//! A rule whose input is absent or indeterminate is skipped. Composite
//! scores are clamped to [0, 100]; momentum scores are unbounded.

use std::fmt;
use std::str::FromStr;

use crate::domain::fundamentals::Fundamentals;
use crate::domain::indicator::candlestick::{self, CandlePattern};
use crate::domain::indicator::set::{IndicatorParams, IndicatorSet};

pub const COMPOSITE_BASE: f64 = 50.0;
pub const MOMENTUM_BASE: f64 = 0.0;
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScoringPolicy {
    #[default]
    Composite,
    Momentum,
}

impl ScoringPolicy {
    pub fn needs_fundamentals(self) -> bool {
        matches!(self, ScoringPolicy::Composite)
    }
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringPolicy::Composite => f.write_str("composite"),
            ScoringPolicy::Momentum => f.write_str("momentum"),
        }
    }
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "composite" => Ok(ScoringPolicy::Composite),
            "momentum" => Ok(ScoringPolicy::Momentum),
            other => Err(format!("unknown scoring policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub rule: &'static str,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub value: f64,
    pub policy: ScoringPolicy,
    pub contributions: Vec<Contribution>,
}

struct Tally {
    total: f64,
    contributions: Vec<Contribution>,
}

impl Tally {
    fn new(base: f64) -> Self {
        Self {
            total: base,
            contributions: Vec::new(),
        }
    }

    fn apply(&mut self, fired: Option<bool>, rule: &'static str, delta: f64) {
        if fired == Some(true) {
            self.total += delta;
            self.contributions.push(Contribution { rule, delta });
        }
    }
}

pub fn score(
    policy: ScoringPolicy,
    fundamentals: &Fundamentals,
    indicators: &IndicatorSet,
    params: &IndicatorParams,
) -> Score {
    match policy {
        ScoringPolicy::Composite => composite_score(fundamentals, indicators, params),
        ScoringPolicy::Momentum => momentum_score(indicators, params),
    }
}

pub fn composite_score(
    fundamentals: &Fundamentals,
    indicators: &IndicatorSet,
    params: &IndicatorParams,
) -> Score {
    let mut tally = Tally::new(COMPOSITE_BASE);

    tally.apply(fundamentals.pe_ratio.map(|pe| pe < 20.0), "PE < 20", 10.0);
    tally.apply(fundamentals.roe_pct.map(|roe| roe > 15.0), "ROE > 15%", 10.0);
    tally.apply(
        fundamentals.dividend_yield_pct.map(|y| y > 2.0),
        "dividend yield > 2%",
        5.0,
    );

    let rsi = indicators.rsi(params.rsi_period);
    tally.apply(rsi.map(|r| r < 30.0), "RSI oversold", 5.0);
    tally.apply(rsi.map(|r| r > 70.0), "RSI overbought", -5.0);

    let trend = indicators
        .ema(params.trend_fast)
        .zip(indicators.ema(params.trend_slow))
        .map(|(fast, slow)| fast > slow);
    tally.apply(trend, "EMA trend up", 10.0);

    let macd = indicators.macd(params.macd_fast, params.macd_slow, params.macd_signal);
    tally.apply(macd.map(|m| m.line > m.signal), "MACD above signal", 10.0);

    tally.apply(indicators.bullish_pattern(), "bullish candle", 2.0);
    tally.apply(
        indicators
            .pattern(CandlePattern::Doji)
            .map(|f| f != candlestick::NONE),
        "doji",
        1.0,
    );

    Score {
        value: tally.total.clamp(SCORE_MIN, SCORE_MAX),
        policy: ScoringPolicy::Composite,
        contributions: tally.contributions,
    }
}

pub fn momentum_score(indicators: &IndicatorSet, params: &IndicatorParams) -> Score {
    let mut tally = Tally::new(MOMENTUM_BASE);

    let rsi = indicators.rsi(params.rsi_period);
    tally.apply(rsi.map(|r| r < 30.0), "RSI oversold", 15.0);
    tally.apply(rsi.map(|r| r > 70.0), "RSI overbought", -15.0);

    let macd = indicators.macd(params.macd_fast, params.macd_slow, params.macd_signal);
    tally.apply(macd.map(|m| m.line > m.signal), "MACD above signal", 20.0);
    tally.apply(macd.map(|m| m.line <= m.signal), "MACD at or below signal", -10.0);

    Score {
        value: tally.total,
        policy: ScoringPolicy::Momentum,
        contributions: tally.contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{IndicatorType, IndicatorValue, MacdReading};
    use proptest::prelude::*;

    fn params() -> IndicatorParams {
        IndicatorParams::default()
    }

    fn macd_value(line: f64, signal: f64) -> Option<IndicatorValue> {
        Some(IndicatorValue::Macd(MacdReading {
            line,
            signal,
            histogram: line - signal,
        }))
    }

    fn indicators(rsi: Option<f64>, ema50: Option<f64>, ema200: Option<f64>) -> IndicatorSet {
        IndicatorSet::default()
            .with_value(IndicatorType::Rsi(14), rsi.map(IndicatorValue::Simple))
            .with_value(IndicatorType::Ema(50), ema50.map(IndicatorValue::Simple))
            .with_value(IndicatorType::Ema(200), ema200.map(IndicatorValue::Simple))
    }

    fn macd_type() -> IndicatorType {
        params().macd_type()
    }

    #[test]
    fn everything_absent_is_base() {
        let s = composite_score(&Fundamentals::default(), &IndicatorSet::default(), &params());
        assert_eq!(s.value, 50.0);
        assert!(s.contributions.is_empty());
        assert_eq!(s.policy, ScoringPolicy::Composite);
    }

    #[test]
    fn fundamentals_rules() {
        let f = Fundamentals {
            pe_ratio: Some(15.0),
            roe_pct: Some(22.0),
            dividend_yield_pct: Some(2.5),
            ..Default::default()
        };
        let s = composite_score(&f, &IndicatorSet::default(), &params());
        assert_eq!(s.value, 75.0);
        assert_eq!(s.contributions.len(), 3);
    }

    #[test]
    fn fundamentals_at_thresholds_do_not_fire() {
        let f = Fundamentals {
            pe_ratio: Some(20.0),
            roe_pct: Some(15.0),
            dividend_yield_pct: Some(2.0),
            ..Default::default()
        };
        let s = composite_score(&f, &IndicatorSet::default(), &params());
        assert_eq!(s.value, 50.0);
    }

    #[test]
    fn rsi_extremes() {
        let oversold = composite_score(
            &Fundamentals::default(),
            &indicators(Some(25.0), None, None),
            &params(),
        );
        assert_eq!(oversold.value, 55.0);

        let overbought = composite_score(
            &Fundamentals::default(),
            &indicators(Some(75.0), None, None),
            &params(),
        );
        assert_eq!(overbought.value, 45.0);
    }

    #[test]
    fn trend_rule_needs_both_emas() {
        let s = composite_score(
            &Fundamentals::default(),
            &indicators(None, Some(110.0), None),
            &params(),
        );
        assert_eq!(s.value, 50.0);

        let s = composite_score(
            &Fundamentals::default(),
            &indicators(None, Some(110.0), Some(100.0)),
            &params(),
        );
        assert_eq!(s.value, 60.0);
    }

    #[test]
    fn macd_and_patterns() {
        let set = IndicatorSet::default()
            .with_value(macd_type(), macd_value(1.5, 1.0))
            .with_pattern(CandlePattern::Hammer, Some(candlestick::BULLISH))
            .with_pattern(CandlePattern::Doji, Some(candlestick::BULLISH));
        let s = composite_score(&Fundamentals::default(), &set, &params());
        assert_eq!(s.value, 63.0);
    }

    #[test]
    fn composite_maximum_is_clamped() {
        let f = Fundamentals {
            pe_ratio: Some(10.0),
            roe_pct: Some(30.0),
            dividend_yield_pct: Some(4.0),
            ..Default::default()
        };
        let set = indicators(Some(20.0), Some(2.0), Some(1.0))
            .with_value(macd_type(), macd_value(1.0, 0.0))
            .with_pattern(CandlePattern::Hammer, Some(candlestick::BULLISH))
            .with_pattern(CandlePattern::Doji, Some(candlestick::BULLISH));
        let s = composite_score(&f, &set, &params());
        assert_eq!(s.value, 100.0);
    }

    #[test]
    fn momentum_rules() {
        let set = indicators(Some(25.0), None, None).with_value(macd_type(), macd_value(2.0, 1.0));
        let s = momentum_score(&set, &params());
        assert_eq!(s.value, 35.0);
        assert_eq!(s.policy, ScoringPolicy::Momentum);

        let set = indicators(Some(80.0), None, None).with_value(macd_type(), macd_value(1.0, 1.0));
        let s = momentum_score(&set, &params());
        assert_eq!(s.value, -25.0);
    }

    #[test]
    fn momentum_skips_indeterminate_inputs() {
        let s = momentum_score(&IndicatorSet::default(), &params());
        assert_eq!(s.value, 0.0);
    }

    #[test]
    fn momentum_ignores_fundamentals() {
        let f = Fundamentals {
            pe_ratio: Some(5.0),
            ..Default::default()
        };
        let s = score(ScoringPolicy::Momentum, &f, &IndicatorSet::default(), &params());
        assert_eq!(s.value, 0.0);
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("Composite".parse::<ScoringPolicy>(), Ok(ScoringPolicy::Composite));
        assert_eq!(" momentum ".parse::<ScoringPolicy>(), Ok(ScoringPolicy::Momentum));
        assert!("mixed".parse::<ScoringPolicy>().is_err());
        assert_eq!(ScoringPolicy::Momentum.to_string(), "momentum");
    }

    proptest! {
        #[test]
        fn composite_score_is_bounded(
            pe in prop::option::of(-50.0f64..200.0),
            roe in prop::option::of(-100.0f64..100.0),
            dy in prop::option::of(0.0f64..20.0),
            rsi in prop::option::of(0.0f64..=100.0),
            ema_fast in prop::option::of(1.0f64..500.0),
            ema_slow in prop::option::of(1.0f64..500.0),
            line in -5.0f64..5.0,
            signal in -5.0f64..5.0,
            hammer in prop::option::of(prop::sample::select(vec![0, 100])),
            doji in prop::option::of(prop::sample::select(vec![0, 100])),
        ) {
            let f = Fundamentals {
                pe_ratio: pe,
                roe_pct: roe,
                dividend_yield_pct: dy,
                ..Default::default()
            };
            let set = indicators(rsi, ema_fast, ema_slow)
                .with_value(macd_type(), macd_value(line, signal))
                .with_pattern(CandlePattern::Hammer, hammer)
                .with_pattern(CandlePattern::Doji, doji);
            let s = composite_score(&f, &set, &params());
            prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&s.value));
        }
    }
}
