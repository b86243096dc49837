//! One evaluation cycle per symbol: fetch, indicators, score, classify, alert.
//!
//! A cycle holds the symbol's alert slot for its whole duration, so two
//! cycles for the same symbol never overlap. Different symbols use different
//! slots and run independently on the batch pool.

use std::fmt;

use chrono::{NaiveDate, Utc};
use rayon::prelude::*;

use crate::domain::alert::{self, AlertDispatcher, AlertEvent};
use crate::domain::error::MarketScoreError;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::indicator::set::{IndicatorParams, IndicatorSet};
use crate::domain::recommendation::{self, Recommendation};
use crate::domain::scoring::{self, Score, ScoringPolicy};
use crate::ports::alert_port::AlertSink;
use crate::ports::data_port::{FundamentalsPort, MarketDataPort};

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub policy: ScoringPolicy,
    pub indicators: IndicatorParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    NoBars,
    NoFundamentals,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::NoBars => f.write_str("no price data in range"),
            Unavailable::NoFundamentals => f.write_str("no fundamentals record"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSymbol {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub last_close: f64,
    pub fundamentals: Option<Fundamentals>,
    pub indicators: IndicatorSet,
    pub score: Score,
    pub recommendation: Recommendation,
    pub alert: Option<AlertEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Scored(Box<ScoredSymbol>),
    Unavailable { symbol: String, reason: Unavailable },
}

impl Evaluation {
    pub fn symbol(&self) -> &str {
        match self {
            Evaluation::Scored(s) => &s.symbol,
            Evaluation::Unavailable { symbol, .. } => symbol,
        }
    }

    pub fn recommendation(&self) -> Option<Recommendation> {
        match self {
            Evaluation::Scored(s) => Some(s.recommendation),
            Evaluation::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct BatchEntry {
    pub symbol: String,
    pub outcome: Result<Evaluation, MarketScoreError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn scored(&self) -> impl Iterator<Item = &ScoredSymbol> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Ok(Evaluation::Scored(s)) => Some(s.as_ref()),
            _ => None,
        })
    }

    pub fn unavailable(&self) -> impl Iterator<Item = (&str, Unavailable)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Ok(Evaluation::Unavailable { symbol, reason }) => Some((symbol.as_str(), *reason)),
            _ => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &MarketScoreError)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Err(err) => Some((e.symbol.as_str(), err)),
            Ok(_) => None,
        })
    }

    /// Mean score across scored symbols only.
    pub fn mean_score(&self) -> Option<f64> {
        let scores: Vec<f64> = self.scored().map(|s| s.score.value).collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }
}

pub fn build_pool(workers: usize) -> Result<rayon::ThreadPool, MarketScoreError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("marketscore-eval-{i}"))
        .build()
        .map_err(|e| MarketScoreError::Io(std::io::Error::other(e)))
}

/// "Hold based on latest RSI (55.20) and MACD (1.32)"
pub fn alert_message(
    recommendation: Recommendation,
    indicators: &IndicatorSet,
    params: &IndicatorParams,
) -> String {
    let fmt_opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
    let rsi = indicators.rsi(params.rsi_period);
    let macd = indicators
        .macd(params.macd_fast, params.macd_slow, params.macd_signal)
        .map(|m| m.line);
    format!(
        "{recommendation} based on latest RSI ({}) and MACD ({})",
        fmt_opt(rsi),
        fmt_opt(macd)
    )
}

pub struct Evaluator<'a> {
    market: &'a dyn MarketDataPort,
    fundamentals: &'a dyn FundamentalsPort,
    dispatcher: &'a AlertDispatcher,
    sink: &'a dyn AlertSink,
    config: EvaluationConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        market: &'a dyn MarketDataPort,
        fundamentals: &'a dyn FundamentalsPort,
        dispatcher: &'a AlertDispatcher,
        sink: &'a dyn AlertSink,
        config: EvaluationConfig,
    ) -> Self {
        Self {
            market,
            fundamentals,
            dispatcher,
            sink,
            config,
        }
    }

    pub fn evaluate(&self, symbol: &str) -> Result<Evaluation, MarketScoreError> {
        let slot = self.dispatcher.slot(symbol);
        let mut state = alert::lock_slot(&slot);

        let series = self
            .market
            .fetch_bars(symbol, self.config.start_date, self.config.end_date)?;
        let Some(last) = series.last() else {
            tracing::info!(symbol, "no bars in range, skipping");
            return Ok(Evaluation::Unavailable {
                symbol: symbol.to_string(),
                reason: Unavailable::NoBars,
            });
        };
        let (as_of, last_close) = (last.date, last.close);

        let fundamentals = if self.config.policy.needs_fundamentals() {
            match self.fundamentals.fetch_fundamentals(symbol)? {
                Some(f) => Some(f),
                None => {
                    tracing::info!(symbol, "no fundamentals record, skipping");
                    return Ok(Evaluation::Unavailable {
                        symbol: symbol.to_string(),
                        reason: Unavailable::NoFundamentals,
                    });
                }
            }
        } else {
            None
        };

        let params = &self.config.indicators;
        let indicators = IndicatorSet::compute(&series, params);
        let score = scoring::score(
            self.config.policy,
            fundamentals.as_ref().unwrap_or(&Fundamentals::default()),
            &indicators,
            params,
        );
        let recommendation = recommendation::classify(&score);
        let message = alert_message(recommendation, &indicators, params);
        let alert = alert::dispatch(
            &mut state,
            symbol,
            recommendation,
            &message,
            self.sink,
            Utc::now(),
        );

        tracing::info!(
            symbol,
            bars = series.len(),
            score = score.value,
            policy = %score.policy,
            %recommendation,
            alerted = alert.is_some(),
            "evaluated"
        );

        Ok(Evaluation::Scored(Box::new(ScoredSymbol {
            symbol: symbol.to_string(),
            as_of,
            last_close,
            fundamentals,
            indicators,
            score,
            recommendation,
            alert,
        })))
    }

    /// Evaluate every symbol on `pool`. Results keep the input order; a
    /// failing symbol only affects its own entry.
    pub fn evaluate_batch(&self, symbols: &[String], pool: &rayon::ThreadPool) -> BatchReport {
        let entries: Vec<BatchEntry> = pool.install(|| {
            symbols
                .par_iter()
                .map(|symbol| {
                    let outcome = self.evaluate(symbol);
                    if let Err(e) = &outcome {
                        tracing::warn!(symbol = %symbol, error = %e, "evaluation failed");
                    }
                    BatchEntry {
                        symbol: symbol.clone(),
                        outcome,
                    }
                })
                .collect()
        });

        let report = BatchReport { entries };
        tracing::info!(
            total = symbols.len(),
            scored = report.scored().count(),
            unavailable = report.unavailable().count(),
            failed = report.failed().count(),
            "batch complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{IndicatorType, IndicatorValue, MacdReading};

    #[test]
    fn message_with_values() {
        let params = IndicatorParams::default();
        let set = IndicatorSet::default()
            .with_value(IndicatorType::Rsi(14), Some(IndicatorValue::Simple(55.2)))
            .with_value(
                params.macd_type(),
                Some(IndicatorValue::Macd(MacdReading {
                    line: 1.318,
                    signal: 1.0,
                    histogram: 0.318,
                })),
            );
        assert_eq!(
            alert_message(Recommendation::Hold, &set, &params),
            "Hold based on latest RSI (55.20) and MACD (1.32)"
        );
    }

    #[test]
    fn message_with_indeterminate_values() {
        let params = IndicatorParams::default();
        assert_eq!(
            alert_message(Recommendation::Sell, &IndicatorSet::default(), &params),
            "Sell based on latest RSI (n/a) and MACD (n/a)"
        );
    }

    #[test]
    fn unavailable_display() {
        assert_eq!(Unavailable::NoBars.to_string(), "no price data in range");
    }

    #[test]
    fn empty_report_has_no_mean() {
        assert_eq!(BatchReport::default().mean_score(), None);
    }

    #[test]
    fn pool_has_at_least_one_worker() {
        let pool = build_pool(0).unwrap();
        assert_eq!(pool.current_num_threads(), 1);
    }
}
