//! Per-bar technicals table for the most recent bars.

use chrono::NaiveDate;

use crate::domain::indicator::set::IndicatorParams;
use crate::domain::indicator::{calculate_ema, calculate_macd, calculate_rsi, calculate_sma};
use crate::domain::ohlcv::BarSeries;

pub const DEFAULT_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct TechnicalRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: Option<f64>,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
}

/// The last `rows` bars with their overlay, RSI and MACD readings, oldest first.
pub fn technical_snapshot(
    series: &BarSeries,
    params: &IndicatorParams,
    rows: usize,
) -> Vec<TechnicalRow> {
    let bars = series.bars();
    let sma = calculate_sma(bars, params.overlay_period);
    let ema = calculate_ema(bars, params.overlay_period);
    let rsi = calculate_rsi(bars, params.rsi_period);
    let macd = calculate_macd(bars, params.macd_fast, params.macd_slow, params.macd_signal);

    let start = bars.len().saturating_sub(rows);
    bars.iter()
        .enumerate()
        .skip(start)
        .map(|(i, bar)| {
            let m = macd
                .values
                .get(i)
                .and_then(|p| p.value)
                .and_then(|v| v.as_macd());
            TechnicalRow {
                date: bar.date,
                close: bar.close,
                sma: sma.simple_at(i),
                ema: ema.simple_at(i),
                rsi: rsi.simple_at(i),
                macd: m.map(|m| m.line),
                macd_signal: m.map(|m| m.signal),
                macd_hist: m.map(|m| m.histogram),
            }
        })
        .collect()
}
