//! Configuration for coverage logging.

use serde::{Deserialize, Serialize};

/// Configuration for the coverage log.
///
/// Controls how many events are retained and how they are echoed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Whether events are recorded at all.
    pub enabled: bool,

    /// Ring buffer size (number of events to retain).
    pub buffer_size: usize,

    /// Echo each event through `tracing` as it is recorded.
    pub echo: bool,

    /// Output format: true for JSON, false for human-readable.
    pub json_output: bool,

    /// Record only these event types (empty = all).
    pub event_filter: Vec<String>,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            buffer_size: 10_000,
            echo: false,
            json_output: false,
            event_filter: Vec::new(),
        }
    }
}

impl CoverageConfig {
    /// Creates a configuration with recording switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Creates a configuration for grammar development: everything is kept
    /// and echoed.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            buffer_size: 50_000,
            echo: true,
            json_output: false,
            event_filter: Vec::new(),
        }
    }

    /// Builder method to set enabled state.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder method to set buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Builder method to enable/disable echoing.
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Builder method to enable/disable JSON output.
    #[must_use]
    pub fn with_json_output(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }

    /// Builder method to keep only some event types
    /// (`accepted`, `clarification`, `rejected`).
    #[must_use]
    pub fn filter_events(mut self, types: Vec<String>) -> Self {
        self.event_filter = types;
        self
    }
}
