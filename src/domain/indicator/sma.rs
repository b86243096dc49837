//! Simple Moving Average indicator.
//!
//! SMA[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are indeterminate.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries::empty(IndicatorType::Sma(period));
    }

    let mut values = Vec::with_capacity(bars.len());
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        sum += bar.close;
        if i >= period {
            sum -= bars[i - period].close;
        }
        let value = (i + 1 >= period).then(|| IndicatorValue::Simple(sum / period as f64));
        values.push(IndicatorPoint {
            date: bar.date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    #[test]
    fn sma_warmup() {
        let series = calculate_sma(&make_bars(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert!(series.values[0].value.is_none());
        assert!(series.values[1].value.is_none());
        assert_eq!(series.simple_at(2), Some(2.0));
        assert_eq!(series.simple_at(3), Some(3.0));
    }

    #[test]
    fn sma_uses_last_period_closes() {
        let series = calculate_sma(&make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]), 2);
        assert_eq!(series.latest_simple(), Some(45.0));
    }

    #[test]
    fn sma_insufficient_history() {
        let series = calculate_sma(&make_bars(&[10.0, 20.0]), 5);
        assert_eq!(series.values.len(), 2);
        assert_eq!(series.latest(), None);
    }

    #[test]
    fn sma_period_0() {
        let series = calculate_sma(&make_bars(&[10.0]), 0);
        assert!(series.values.is_empty());
    }
}
