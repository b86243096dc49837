//! Fundamental metrics for a symbol. Every field is optional.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fundamentals {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub pe_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    /// Return on equity, in percent.
    pub roe_pct: Option<f64>,
    /// Dividend yield, in percent.
    pub dividend_yield_pct: Option<f64>,
    pub market_cap: Option<f64>,
    pub debt_to_equity: Option<f64>,
}

impl Fundamentals {
    /// True when no numeric metric is present.
    pub fn is_empty(&self) -> bool {
        [
            self.pe_ratio,
            self.price_to_book,
            self.roe_pct,
            self.dividend_yield_pct,
            self.market_cap,
            self.debt_to_equity,
        ]
        .iter()
        .all(Option::is_none)
    }
}
