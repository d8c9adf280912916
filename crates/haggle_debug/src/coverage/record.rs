//! Coverage record types.

use serde::{Deserialize, Serialize};

use haggle_engine::DiagnosticEvent;
use haggle_foundation::{Intent, SessionId};

/// Event type name of accepted commands.
pub const ACCEPTED: &str = "accepted";
/// Event type name of clarification questions.
pub const CLARIFICATION: &str = "clarification";
/// Event type name of rejections.
pub const REJECTED: &str = "rejected";

/// A diagnostic event with its position in the log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoverageRecord {
    /// Monotonically increasing record id.
    pub id: u64,
    /// Milliseconds since the log was created.
    pub timestamp_ms: u64,
    /// The event.
    pub event: DiagnosticEvent,
}

impl CoverageRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(id: u64, timestamp_ms: u64, event: DiagnosticEvent) -> Self {
        Self {
            id,
            timestamp_ms,
            event,
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        event_type(&self.event)
    }

    /// The session the event belongs to, when known.
    #[must_use]
    pub fn session(&self) -> Option<&SessionId> {
        self.event.session()
    }

    /// The rule involved, if any rule matched.
    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        match &self.event {
            DiagnosticEvent::Accepted { rule_id, .. } | DiagnosticEvent::ClarificationRequested { rule_id, .. } => {
                Some(rule_id)
            }
            DiagnosticEvent::Rejected(d) => d.best_candidate.as_ref().map(|c| c.rule_id.as_str()),
        }
    }

    /// The intent involved, if any rule matched.
    #[must_use]
    pub fn intent(&self) -> Option<Intent> {
        match &self.event {
            DiagnosticEvent::Accepted { intent, .. } | DiagnosticEvent::ClarificationRequested { intent, .. } => {
                Some(*intent)
            }
            DiagnosticEvent::Rejected(d) => d.best_candidate.as_ref().map(|c| c.intent),
        }
    }
}

/// Returns the type name of an event.
#[must_use]
pub fn event_type(event: &DiagnosticEvent) -> &'static str {
    match event {
        DiagnosticEvent::Accepted { .. } => ACCEPTED,
        DiagnosticEvent::ClarificationRequested { .. } => CLARIFICATION,
        DiagnosticEvent::Rejected(_) => REJECTED,
    }
}
