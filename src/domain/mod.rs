//! Core domain types and logic.

pub mod alert;
pub mod config_validation;
pub mod error;
pub mod evaluation;
pub mod fundamentals;
pub mod indicator;
pub mod ohlcv;
pub mod portfolio;
pub mod recommendation;
pub mod schedule;
pub mod scoring;
pub mod sip;
pub mod watchlist;
