//! Holdings valuation against a price lookup.

use crate::ports::data_port::PriceLookupPort;

#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Priced { price: f64, value: f64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowValuation {
    pub symbol: String,
    pub quantity: f64,
    pub outcome: RowOutcome,
}

impl RowValuation {
    pub fn value(&self) -> Option<f64> {
        match self.outcome {
            RowOutcome::Priced { value, .. } => Some(value),
            RowOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioValuation {
    pub rows: Vec<RowValuation>,
    /// Sum over priced rows only.
    pub total: f64,
}

impl PortfolioValuation {
    pub fn failed(&self) -> impl Iterator<Item = &RowValuation> {
        self.rows
            .iter()
            .filter(|r| matches!(r.outcome, RowOutcome::Failed { .. }))
    }

    pub fn priced_count(&self) -> usize {
        self.rows.iter().filter(|r| r.value().is_some()).count()
    }
}

/// Value every holding; a failed lookup marks that row and is left out of
/// the total.
pub fn value_holdings(holdings: &[Holding], prices: &dyn PriceLookupPort) -> PortfolioValuation {
    let rows: Vec<RowValuation> = holdings
        .iter()
        .map(|h| {
            let outcome = match prices.latest_price(&h.symbol) {
                Ok(price) => RowOutcome::Priced {
                    price,
                    value: price * h.quantity,
                },
                Err(e) => {
                    tracing::warn!(symbol = %h.symbol, error = %e, "could not price holding");
                    RowOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            RowValuation {
                symbol: h.symbol.clone(),
                quantity: h.quantity,
                outcome,
            }
        })
        .collect();

    let total = rows.iter().filter_map(RowValuation::value).sum();
    PortfolioValuation { rows, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::MarketScoreError;
    use std::collections::HashMap;

    struct MapPrices(HashMap<String, f64>);

    impl PriceLookupPort for MapPrices {
        fn latest_price(&self, symbol: &str) -> Result<f64, MarketScoreError> {
            self.0
                .get(symbol)
                .copied()
                .ok_or_else(|| MarketScoreError::PriceLookup {
                    symbol: symbol.to_string(),
                    reason: "not quoted".into(),
                })
        }
    }

    fn prices(entries: &[(&str, f64)]) -> MapPrices {
        MapPrices(entries.iter().map(|(s, p)| (s.to_string(), *p)).collect())
    }

    #[test]
    fn failed_row_is_excluded_from_total() {
        let holdings = vec![Holding::new("A", 10.0), Holding::new("B", 5.0)];
        let valuation = value_holdings(&holdings, &prices(&[("A", 100.0)]));

        assert!((valuation.total - 1000.0).abs() < f64::EPSILON);
        assert_eq!(valuation.priced_count(), 1);
        let failed: Vec<_> = valuation.failed().map(|r| r.symbol.as_str()).collect();
        assert_eq!(failed, vec!["B"]);
        assert!(matches!(
            &valuation.rows[1].outcome,
            RowOutcome::Failed { reason } if reason.contains("not quoted")
        ));
    }

    #[test]
    fn all_rows_priced() {
        let holdings = vec![Holding::new("A", 2.0), Holding::new("B", 3.0)];
        let valuation = value_holdings(&holdings, &prices(&[("A", 10.0), ("B", 20.0)]));
        assert!((valuation.total - 80.0).abs() < f64::EPSILON);
        assert_eq!(
            valuation.rows[1].outcome,
            RowOutcome::Priced {
                price: 20.0,
                value: 60.0
            }
        );
    }

    #[test]
    fn empty_holdings() {
        let valuation = value_holdings(&[], &prices(&[]));
        assert!(valuation.rows.is_empty());
        assert_eq!(valuation.total, 0.0);
    }

    #[test]
    fn all_rows_failed() {
        let holdings = vec![Holding::new("X", 1.0)];
        let valuation = value_holdings(&holdings, &prices(&[]));
        assert_eq!(valuation.total, 0.0);
        assert_eq!(valuation.failed().count(), 1);
    }
}
