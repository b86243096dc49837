//! Score to recommendation mapping.
//!
//! Composite: >= 70 Strong Buy, [40, 70) Hold, < 40 Sell.
//! Momentum:  >= 20 Strong Buy, (0, 20) Hold, <= 0 Sell.

use std::fmt;
use std::str::FromStr;

use crate::domain::scoring::{Score, ScoringPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recommendation {
    StrongBuy,
    Hold,
    Sell,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::StrongBuy => f.write_str("Strong Buy"),
            Recommendation::Hold => f.write_str("Hold"),
            Recommendation::Sell => f.write_str("Sell"),
        }
    }
}

impl FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "strong buy" | "strongbuy" => Ok(Recommendation::StrongBuy),
            "hold" => Ok(Recommendation::Hold),
            "sell" => Ok(Recommendation::Sell),
            other => Err(format!("unknown recommendation '{other}'")),
        }
    }
}

pub fn classify(score: &Score) -> Recommendation {
    classify_value(score.policy, score.value)
}

pub fn classify_value(policy: ScoringPolicy, value: f64) -> Recommendation {
    match policy {
        ScoringPolicy::Composite => {
            if value >= 70.0 {
                Recommendation::StrongBuy
            } else if value >= 40.0 {
                Recommendation::Hold
            } else {
                Recommendation::Sell
            }
        }
        ScoringPolicy::Momentum => {
            if value >= 20.0 {
                Recommendation::StrongBuy
            } else if value > 0.0 {
                Recommendation::Hold
            } else {
                Recommendation::Sell
            }
        }
    }
}
