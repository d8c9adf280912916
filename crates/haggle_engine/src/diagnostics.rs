//! Diagnostics emitted by the dispatch controller.
//!
//! Every rejection produces a [`Diagnostic`], and every accepted command and
//! clarification question is reported too, so grammar coverage can be
//! measured. Events carry the session id and the text typed, nothing else
//! about the player.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use haggle_foundation::{EntityKind, Intent, SessionId};
use haggle_resolver::UnresolvedCause;

use crate::policy::Decision;

/// Why an input was handed to the fallback interpreter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectionReason {
    /// Nothing left after normalization, or more tokens than the policy allows.
    MalformedInput,
    /// No grammar rule matched.
    NoMatchingRule,
    /// A slot the player typed names nothing usable.
    UnresolvedSlot {
        /// Slot name.
        slot: String,
        /// Slot kind.
        kind: EntityKind,
        /// What the player typed.
        raw: String,
        /// Why it did not resolve.
        cause: UnresolvedCause,
    },
    /// More than one slot is ambiguous.
    MultipleAmbiguousSlots {
        /// Names of the ambiguous slots.
        slots: Vec<String>,
    },
    /// Overall confidence is below the clarify threshold.
    LowConfidence {
        /// The best overall confidence.
        confidence: f64,
    },
    /// The context provider could not describe the session.
    ContextUnavailable {
        /// The provider's message.
        message: String,
    },
    /// The clarification token is not known.
    UnknownClarification,
    /// The clarification expired before it was answered.
    ClarificationExpired,
    /// The follow-up did not answer the question.
    UnansweredClarification,
    /// The player declined the suggested reading.
    ClarificationDeclined,
    /// The clarified command is still not certain enough.
    ClarificationExhausted {
        /// Overall confidence after the answer.
        confidence: f64,
    },
}

impl RejectionReason {
    /// A stable short code, used to aggregate coverage.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput => "malformed-input",
            Self::NoMatchingRule => "no-matching-rule",
            Self::UnresolvedSlot { .. } => "unresolved-slot",
            Self::MultipleAmbiguousSlots { .. } => "multiple-ambiguous-slots",
            Self::LowConfidence { .. } => "low-confidence",
            Self::ContextUnavailable { .. } => "context-unavailable",
            Self::UnknownClarification => "unknown-clarification",
            Self::ClarificationExpired => "clarification-expired",
            Self::UnansweredClarification => "unanswered-clarification",
            Self::ClarificationDeclined => "clarification-declined",
            Self::ClarificationExhausted { .. } => "clarification-exhausted",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput => write!(f, "empty, unreadable or overlong input"),
            Self::NoMatchingRule => write!(f, "no grammar rule matched"),
            Self::UnresolvedSlot { slot, kind, raw, cause } => {
                write!(f, "{kind} slot `{slot}` (\"{raw}\"): {cause}")
            }
            Self::MultipleAmbiguousSlots { slots } => {
                write!(f, "several ambiguous slots: {}", slots.join(", "))
            }
            Self::LowConfidence { confidence } => write!(f, "low confidence ({confidence:.2})"),
            Self::ContextUnavailable { message } => write!(f, "context unavailable: {message}"),
            Self::UnknownClarification => write!(f, "unknown clarification token"),
            Self::ClarificationExpired => write!(f, "clarification expired"),
            Self::UnansweredClarification => write!(f, "follow-up did not answer the question"),
            Self::ClarificationDeclined => write!(f, "player declined the suggestion"),
            Self::ClarificationExhausted { confidence } => {
                write!(f, "still uncertain after clarification ({confidence:.2})")
            }
        }
    }
}

/// The best candidate seen before a rejection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateSummary {
    /// Candidate intent.
    pub intent: Intent,
    /// Matched rule.
    pub rule_id: String,
    /// Overall confidence.
    pub confidence: f64,
    /// How the policy classified it.
    pub decision: Decision,
}

/// A rejected input, handed to the fallback interpreter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    /// Session that typed the input, when known.
    pub session: Option<SessionId>,
    /// The original input.
    pub raw_input: String,
    /// The clarification answer, if the rejection happened on resume.
    pub follow_up: Option<String>,
    /// The best candidate seen, if any rule matched.
    pub best_candidate: Option<CandidateSummary>,
    /// Why the input was rejected.
    pub reason: RejectionReason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected \"{}\": {}", self.raw_input, self.reason)?;
        if let Some(best) = &self.best_candidate {
            write!(f, " (best: {} {:.2})", best.rule_id, best.confidence)?;
        }
        Ok(())
    }
}

/// What the dispatch controller reports.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiagnosticEvent {
    /// A command was dispatched.
    Accepted {
        /// Session that typed it.
        session: SessionId,
        /// Its intent.
        intent: Intent,
        /// The rule that matched.
        rule_id: String,
        /// Overall confidence.
        confidence: f64,
        /// True if a clarification preceded it.
        clarified: bool,
    },
    /// A clarification question was asked.
    ClarificationRequested {
        /// Session asked.
        session: SessionId,
        /// Intent of the suspended candidate.
        intent: Intent,
        /// Its rule.
        rule_id: String,
        /// Number of options offered.
        options: usize,
    },
    /// An input was rejected.
    Rejected(Diagnostic),
}

impl DiagnosticEvent {
    /// The session the event belongs to, when known.
    #[must_use]
    pub fn session(&self) -> Option<&SessionId> {
        match self {
            Self::Accepted { session, .. } | Self::ClarificationRequested { session, .. } => Some(session),
            Self::Rejected(d) => d.session.as_ref(),
        }
    }
}

/// Receives diagnostic events.
///
/// Implementations must be cheap; they run inside `parse`.
pub trait DiagnosticSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &DiagnosticEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}
