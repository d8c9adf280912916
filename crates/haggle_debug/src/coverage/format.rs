//! Coverage output formatters.
//!
//! Provides human-readable and JSON formatters for coverage records.

use std::fmt::Write;

use haggle_engine::DiagnosticEvent;

use super::record::CoverageRecord;

// =============================================================================
// Coverage Formatter Trait
// =============================================================================

/// Trait for formatting coverage records.
pub trait CoverageFormatter {
    /// Formats a single record to a string.
    fn format(&self, record: &CoverageRecord) -> String;

    /// Formats multiple records, one per line.
    fn format_many(&self, records: &[&CoverageRecord]) -> String {
        records
            .iter()
            .map(|r| self.format(r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Human-Readable Formatter
// =============================================================================

/// Formats coverage records in human-readable form.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    /// Whether to include timestamps.
    pub show_timestamps: bool,
    /// Whether to include record IDs.
    pub show_ids: bool,
}

impl HumanFormatter {
    /// Creates a new human formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to show timestamps.
    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.show_timestamps = true;
        self
    }

    /// Builder method to show record IDs.
    #[must_use]
    pub fn with_ids(mut self) -> Self {
        self.show_ids = true;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_timestamp(ms: u64) -> String {
        if ms >= 60_000 {
            format!("{:.1}m", ms as f64 / 60_000.0)
        } else if ms >= 1000 {
            format!("{:.3}s", ms as f64 / 1000.0)
        } else {
            format!("{ms}ms")
        }
    }
}

impl CoverageFormatter for HumanFormatter {
    fn format(&self, record: &CoverageRecord) -> String {
        let mut line = String::new();
        if self.show_ids {
            let _ = write!(line, "[{:06}] ", record.id);
        }
        if self.show_timestamps {
            let _ = write!(line, "{:>9} ", Self::format_timestamp(record.timestamp_ms));
        }
        let session = record.session().map_or("-", |s| s.as_str());
        let _ = write!(line, "{session:<12} ");

        match &record.event {
            DiagnosticEvent::Accepted {
                rule_id,
                confidence,
                clarified,
                ..
            } => {
                let _ = write!(line, "ACCEPT  {rule_id} ({confidence:.2})");
                if *clarified {
                    line.push_str(" after clarification");
                }
            }
            DiagnosticEvent::ClarificationRequested { rule_id, options, .. } => {
                let _ = write!(line, "CLARIFY {rule_id}");
                if *options > 0 {
                    let _ = write!(line, " [{options} options]");
                }
            }
            DiagnosticEvent::Rejected(diagnostic) => {
                let _ = write!(line, "REJECT  \"{}\" {}", diagnostic.raw_input, diagnostic.reason);
                if let Some(follow_up) = &diagnostic.follow_up {
                    let _ = write!(line, " / answer \"{follow_up}\"");
                }
                if let Some(best) = &diagnostic.best_candidate {
                    let _ = write!(line, " (best: {} {:.2})", best.rule_id, best.confidence);
                }
            }
        }
        line
    }
}

// =============================================================================
// JSON Formatter
// =============================================================================

/// Formats coverage records as JSON, one object per record.
#[derive(Clone, Debug, Default)]
pub struct JsonFormatter {
    /// Whether to pretty-print.
    pub pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method for pretty printing.
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

impl CoverageFormatter for JsonFormatter {
    fn format(&self, record: &CoverageRecord) -> String {
        let value = serde_json::json!({
            "id": record.id,
            "timestamp_ms": record.timestamp_ms,
            "type": record.event_type(),
            "event": &record.event,
        });
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        rendered.unwrap_or_else(|e| serde_json::json!({ "id": record.id, "error": e.to_string() }).to_string())
    }
}
