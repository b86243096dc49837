//! Systematic investment plan (SIP) future value.
//!
//! Contributions are made at the start of each month (annuity-due):
//! FV = P * (((1 + r)^n - 1) / r) * (1 + r), r = annual% / 12 / 100.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SipInput {
    pub monthly_amount: f64,
    pub annual_rate_pct: f64,
    pub months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SipResult {
    pub future_value: f64,
    pub invested: f64,
    pub gain: f64,
}

pub fn future_value(input: &SipInput) -> SipResult {
    let invested = input.monthly_amount * f64::from(input.months);
    let future_value = if input.months == 0 {
        0.0
    } else {
        let r = input.annual_rate_pct / 12.0 / 100.0;
        if r == 0.0 {
            invested
        } else {
            let growth = (1.0 + r).powf(f64::from(input.months));
            input.monthly_amount * ((growth - 1.0) / r) * (1.0 + r)
        }
    };

    SipResult {
        future_value,
        invested,
        gain: future_value - invested,
    }
}
