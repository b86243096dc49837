//! OHLCV bars and validated bar series.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BarError {
    #[error("non-finite price on {date}")]
    NonFinite { date: NaiveDate },

    #[error("high {high} below max(open, close) on {date}")]
    HighTooLow { date: NaiveDate, high: f64 },

    #[error("low {low} above min(open, close) on {date}")]
    LowTooHigh { date: NaiveDate, low: f64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BarSeriesError {
    #[error("bar {index}: {source}")]
    InvalidBar {
        index: usize,
        #[source]
        source: BarError,
    },

    #[error("bar {index} dated {date} does not follow {previous}")]
    OutOfOrder {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl Bar {
    /// Build a bar, rejecting prices that break high/low ordering.
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, BarError> {
        let bar = Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        };
        bar.validate()?;
        Ok(bar)
    }

    pub fn validate(&self) -> Result<(), BarError> {
        if ![self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite())
        {
            return Err(BarError::NonFinite { date: self.date });
        }
        if self.high < self.open.max(self.close) {
            return Err(BarError::HighTooLow {
                date: self.date,
                high: self.high,
            });
        }
        if self.low > self.open.min(self.close) {
            return Err(BarError::LowTooHigh {
                date: self.date,
                low: self.low,
            });
        }
        Ok(())
    }

    /// |close - open|
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    pub fn is_red(&self) -> bool {
        self.close < self.open
    }
}

/// Bars for one symbol in strictly increasing date order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, BarSeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            bar.validate()
                .map_err(|source| BarSeriesError::InvalidBar { index, source })?;
            if index > 0 && bar.date <= bars[index - 1].date {
                return Err(BarSeriesError::OutOfOrder {
                    index,
                    date: bar.date,
                    previous: bars[index - 1].date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}
