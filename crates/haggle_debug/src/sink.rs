//! Diagnostic sinks that forward events elsewhere.

use std::sync::Arc;

use haggle_engine::{DiagnosticEvent, DiagnosticSink};

/// Forwards events to `tracing` under the `haggle::coverage` target.
///
/// Accepted commands and questions are logged at `debug`, rejections at
/// `info` since those are what grammar authors act on.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &DiagnosticEvent) {
        let session = event.session().map_or("-", |s| s.as_str());
        match event {
            DiagnosticEvent::Accepted {
                intent,
                rule_id,
                confidence,
                clarified,
                ..
            } => {
                tracing::debug!(
                    target: "haggle::coverage",
                    session,
                    intent = %intent,
                    rule = %rule_id,
                    confidence,
                    clarified,
                    "accepted"
                );
            }
            DiagnosticEvent::ClarificationRequested {
                intent, rule_id, options, ..
            } => {
                tracing::debug!(
                    target: "haggle::coverage",
                    session,
                    intent = %intent,
                    rule = %rule_id,
                    options,
                    "clarification requested"
                );
            }
            DiagnosticEvent::Rejected(diagnostic) => {
                tracing::info!(
                    target: "haggle::coverage",
                    session,
                    reason = diagnostic.reason.code(),
                    input = %diagnostic.raw_input,
                    best = diagnostic.best_candidate.as_ref().map(|c| c.rule_id.as_str()),
                    "rejected"
                );
            }
        }
    }
}

/// Sends every event to several sinks, in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl FanoutSink {
    /// Creates a sink with no targets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a target.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if there are no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DiagnosticSink for FanoutSink {
    fn record(&self, event: &DiagnosticEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink").field("sinks", &self.sinks.len()).finish()
    }
}
