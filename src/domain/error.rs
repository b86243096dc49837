//! Domain error types.

use crate::domain::ohlcv::BarSeriesError;
use crate::domain::watchlist::WatchlistError;

/// Top-level error type for marketscore.
#[derive(Debug, thiserror::Error)]
pub enum MarketScoreError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("market data error for {symbol}: {reason}")]
    MarketData { symbol: String, reason: String },

    #[error("fundamentals error for {symbol}: {reason}")]
    Fundamentals { symbol: String, reason: String },

    #[error("price lookup failed for {symbol}: {reason}")]
    PriceLookup { symbol: String, reason: String },

    #[error("alert sink unavailable: {reason}")]
    AlertSink { reason: String },

    #[error("invalid bar series for {symbol}: {source}")]
    InvalidBars {
        symbol: String,
        #[source]
        source: BarSeriesError,
    },

    #[error(transparent)]
    Watchlist(#[from] WatchlistError),

    #[error("holdings file {file}: {reason}")]
    Holdings { file: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MarketScoreError> for std::process::ExitCode {
    fn from(err: &MarketScoreError) -> Self {
        let code: u8 = match err {
            MarketScoreError::Io(_) | MarketScoreError::AlertSink { .. } => 1,
            MarketScoreError::ConfigParse { .. }
            | MarketScoreError::ConfigMissing { .. }
            | MarketScoreError::ConfigInvalid { .. } => 2,
            MarketScoreError::MarketData { .. }
            | MarketScoreError::Fundamentals { .. }
            | MarketScoreError::PriceLookup { .. }
            | MarketScoreError::InvalidBars { .. }
            | MarketScoreError::Holdings { .. } => 3,
            MarketScoreError::Watchlist(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
