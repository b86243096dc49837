//! Alert sink adapters.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::error::MarketScoreError;
use crate::domain::recommendation::Recommendation;
use crate::ports::alert_port::AlertSink;

/// Emits alerts as structured log events.
#[derive(Debug, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn emit_alert(
        &self,
        symbol: &str,
        recommendation: Recommendation,
        message: &str,
    ) -> Result<(), MarketScoreError> {
        tracing::info!(symbol, %recommendation, text = message, "alert");
        Ok(())
    }
}

/// Writes one line per alert to a terminal-like writer, optionally ringing
/// the bell first.
pub struct ConsoleAlertSink<W: Write + Send> {
    out: Mutex<W>,
    bell: bool,
}

impl ConsoleAlertSink<io::Stdout> {
    pub fn stdout(bell: bool) -> Self {
        Self::new(io::stdout(), bell)
    }
}

impl<W: Write + Send> ConsoleAlertSink<W> {
    pub fn new(out: W, bell: bool) -> Self {
        Self {
            out: Mutex::new(out),
            bell,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> AlertSink for ConsoleAlertSink<W> {
    fn emit_alert(
        &self,
        symbol: &str,
        _recommendation: Recommendation,
        message: &str,
    ) -> Result<(), MarketScoreError> {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let bell = if self.bell { "\x07" } else { "" };
        writeln!(out, "{bell}[ALERT] {symbol}: {message}")
            .and_then(|_| out.flush())
            .map_err(|e| MarketScoreError::AlertSink {
                reason: e.to_string(),
            })
    }
}
