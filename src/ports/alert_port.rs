//! Alert sink port.

use crate::domain::error::MarketScoreError;
use crate::domain::recommendation::Recommendation;

/// Best-effort alert delivery. A returned error is logged by the caller and
/// never rolls back alert state.
pub trait AlertSink: Send + Sync {
    fn emit_alert(
        &self,
        symbol: &str,
        recommendation: Recommendation,
        message: &str,
    ) -> Result<(), MarketScoreError>;
}
