//! Configuration validation.
//!
//! Validates config fields before any command touches data.

use crate::domain::error::MarketScoreError;
use crate::domain::schedule::{self, MAX_REFRESH_SECS, MIN_REFRESH_SECS};
use crate::domain::scoring::ScoringPolicy;
use crate::domain::watchlist::parse_symbols;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_evaluation_config(config: &dyn ConfigPort) -> Result<(), MarketScoreError> {
    let policy = validate_policy(config)?;
    validate_data_paths(config, policy)?;
    validate_dates(config)?;
    validate_symbols(config)?;
    validate_indicator_periods(config)?;
    Ok(())
}

pub fn validate_watch_config(config: &dyn ConfigPort) -> Result<(), MarketScoreError> {
    validate_evaluation_config(config)?;
    validate_refresh_interval(config)?;
    validate_workers(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> MarketScoreError {
    MarketScoreError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> MarketScoreError {
    MarketScoreError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn validate_policy(config: &dyn ConfigPort) -> Result<ScoringPolicy, MarketScoreError> {
    match config.get_string("scoring", "policy") {
        None => Ok(ScoringPolicy::default()),
        Some(s) => s
            .parse::<ScoringPolicy>()
            .map_err(|reason| invalid("scoring", "policy", reason)),
    }
}

fn validate_data_paths(
    config: &dyn ConfigPort,
    policy: ScoringPolicy,
) -> Result<(), MarketScoreError> {
    match config.get_string("data", "bars_dir") {
        Some(s) if !s.trim().is_empty() => {}
        _ => return Err(missing("data", "bars_dir")),
    }
    if policy.needs_fundamentals() {
        match config.get_string("data", "fundamentals") {
            Some(s) if !s.trim().is_empty() => {}
            _ => return Err(missing("data", "fundamentals")),
        }
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), MarketScoreError> {
    let start_str = config.get_string("evaluation", "start_date");
    let end_str = config.get_string("evaluation", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(invalid(
            "evaluation",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, MarketScoreError> {
    match value {
        None => Err(missing("evaluation", field)),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "evaluation",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), MarketScoreError> {
    match config.get_string("evaluation", "symbols") {
        Some(s) if !s.trim().is_empty() => {
            parse_symbols(&s)?;
            Ok(())
        }
        _ => Err(missing("evaluation", "symbols")),
    }
}

fn validate_indicator_periods(config: &dyn ConfigPort) -> Result<(), MarketScoreError> {
    for key in [
        "rsi_period",
        "macd_fast",
        "macd_slow",
        "macd_signal",
        "trend_fast",
        "trend_slow",
        "overlay_period",
    ] {
        if config.get_int("indicators", key, 1) < 1 {
            return Err(invalid("indicators", key, format!("{key} must be at least 1")));
        }
    }

    let macd_fast = config.get_int("indicators", "macd_fast", 12);
    let macd_slow = config.get_int("indicators", "macd_slow", 26);
    if macd_fast >= macd_slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be shorter than macd_slow",
        ));
    }

    let trend_fast = config.get_int("indicators", "trend_fast", 50);
    let trend_slow = config.get_int("indicators", "trend_slow", 200);
    if trend_fast >= trend_slow {
        return Err(invalid(
            "indicators",
            "trend_fast",
            "trend_fast must be shorter than trend_slow",
        ));
    }
    Ok(())
}

fn validate_refresh_interval(config: &dyn ConfigPort) -> Result<(), MarketScoreError> {
    let secs = config.get_int(
        "watch",
        "refresh_interval",
        schedule::DEFAULT_REFRESH_SECS as i64,
    );
    if secs < 0 || !schedule::refresh_interval_in_range(secs as u64) {
        return Err(invalid(
            "watch",
            "refresh_interval",
            format!(
                "refresh_interval must be between {} and {} seconds",
                MIN_REFRESH_SECS, MAX_REFRESH_SECS
            ),
        ));
    }
    Ok(())
}

fn validate_workers(config: &dyn ConfigPort) -> Result<(), MarketScoreError> {
    if config.get_int("watch", "workers", 4) < 1 {
        return Err(invalid("watch", "workers", "workers must be at least 1"));
    }
    Ok(())
}
