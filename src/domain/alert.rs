//! One-shot alerts on recommendation change.
//!
//! Each symbol moves through `NoAlertYet -> Alerted(rec)`. An alert fires on
//! the first observation and whenever the recommendation differs from the
//! last one alerted. The state advances even when the sink fails, so a
//! failed delivery is never retried as a duplicate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::recommendation::Recommendation;
use crate::ports::alert_port::AlertSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    NoAlertYet,
    Alerted(Recommendation),
}

impl AlertState {
    pub fn last_recommendation(&self) -> Option<Recommendation> {
        match self {
            AlertState::NoAlertYet => None,
            AlertState::Alerted(rec) => Some(*rec),
        }
    }

    pub fn is_transition(&self, next: Recommendation) -> bool {
        self.last_recommendation() != Some(next)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub symbol: String,
    pub recommendation: Recommendation,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// False when the sink reported a failure.
    pub delivered: bool,
}

/// Per-symbol state cell. Holding its lock serialises evaluation cycles for
/// that symbol.
pub type AlertSlot = Arc<Mutex<AlertState>>;

/// A poisoned slot still holds a whole state value, so it is safe to reuse.
pub fn lock_slot(slot: &AlertSlot) -> MutexGuard<'_, AlertState> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Advance `state` with the latest recommendation, emitting through `sink` on
/// a transition.
pub fn dispatch(
    state: &mut AlertState,
    symbol: &str,
    recommendation: Recommendation,
    message: &str,
    sink: &dyn AlertSink,
    now: DateTime<Utc>,
) -> Option<AlertEvent> {
    if !state.is_transition(recommendation) {
        tracing::debug!(symbol, %recommendation, "recommendation unchanged, no alert");
        return None;
    }

    let delivered = match sink.emit_alert(symbol, recommendation, message) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(symbol, %recommendation, error = %e, "alert sink failed");
            false
        }
    };
    *state = AlertState::Alerted(recommendation);

    Some(AlertEvent {
        symbol: symbol.to_string(),
        recommendation,
        message: message.to_string(),
        timestamp: now,
        delivered,
    })
}

/// Owns the alert state of every symbol it has seen.
#[derive(Debug, Default)]
pub struct AlertDispatcher {
    slots: DashMap<String, AlertSlot>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, symbol: &str) -> AlertSlot {
        Arc::clone(self.slots.entry(symbol.to_string()).or_default().value())
    }

    pub fn observe(
        &self,
        symbol: &str,
        recommendation: Recommendation,
        message: &str,
        sink: &dyn AlertSink,
    ) -> Option<AlertEvent> {
        let slot = self.slot(symbol);
        let mut state = lock_slot(&slot);
        dispatch(&mut state, symbol, recommendation, message, sink, Utc::now())
    }

    pub fn last_recommendation(&self, symbol: &str) -> Option<Recommendation> {
        let slot = self.slots.get(symbol).map(|s| Arc::clone(s.value()))?;
        let state = lock_slot(&slot);
        state.last_recommendation()
    }
}
