//! Output context and mode selection.
//!
//! # Mode Selection Logic
//!
//! 1. `--json` flag → JSON mode (the `{message, data}` envelope on stdout)
//! 2. `--quiet` flag → Quiet mode (nothing on stdout for successes)
//! 3. Otherwise → Plain text

use serde::Serialize;

use super::Envelope;
use crate::error::{BoostError, StructuredError};

/// Output mode determining formatting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable lines.
    #[default]
    Plain,

    /// JSON envelopes for machine consumption.
    Json,

    /// No success output; errors still go to stderr.
    Quiet,
}

impl OutputMode {
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Json)
    }

    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputContext {
    mode: OutputMode,
}

impl OutputContext {
    #[must_use]
    pub const fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Create context from CLI flags. `json` beats `quiet`.
    #[must_use]
    pub const fn from_flags(json: bool, quiet: bool) -> Self {
        let mode = if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Plain
        };
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.mode.is_structured()
    }

    /// Print a value as pretty JSON on stdout.
    pub fn json_pretty<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("Error: failed to serialize output: {err}"),
        }
    }

    /// Emit a successful result: the envelope in JSON mode, otherwise the
    /// message followed by whatever `render` prints.
    pub fn emit<T, F>(&self, message: &str, data: Option<&T>, render: F)
    where
        T: Serialize,
        F: FnOnce(&T),
    {
        match self.mode {
            OutputMode::Json => self.json_pretty(&Envelope::new(message, data)),
            OutputMode::Quiet => {}
            OutputMode::Plain => {
                println!("{message}");
                if let Some(data) = data {
                    render(data);
                }
            }
        }
    }

    /// Report a failure. JSON mode writes the error envelope to stdout so
    /// callers parsing output always get JSON; other modes use stderr.
    ///
    /// An empty listing keeps the `{message, data: []}` envelope.
    pub fn error(&self, err: &BoostError) {
        match (self.is_json(), err) {
            (true, BoostError::EmptyResult(message)) => {
                let empty: Vec<serde_json::Value> = Vec::new();
                self.json_pretty(&Envelope::new(message.as_str(), Some(empty)));
            }
            (true, _) => self.json_pretty(&super::ErrorEnvelope {
                error: StructuredError::from(err),
            }),
            (false, _) => eprintln!("Error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_takes_priority() {
        assert_eq!(OutputContext::from_flags(true, true).mode(), OutputMode::Json);
        assert_eq!(OutputContext::from_flags(false, true).mode(), OutputMode::Quiet);
        assert_eq!(OutputContext::from_flags(false, false).mode(), OutputMode::Plain);
    }

    #[test]
    fn quiet_emit_skips_rendering() {
        let ctx = OutputContext::new(OutputMode::Quiet);
        let mut rendered = false;
        ctx.emit("done", Some(&1), |_| rendered = true);
        assert!(!rendered);
    }
}
