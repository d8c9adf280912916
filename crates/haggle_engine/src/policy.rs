//! Confidence and disambiguation policy.
//!
//! A candidate's overall confidence is its grammar confidence times the
//! weakest slot it relies on:
//!
//! ```text
//! effective = base × (1 − penalty)^(expected slots still missing after defaults)
//! overall   = effective × min(confidence of supplied and clarified slots)
//! ```
//!
//! Defaulted slots carry 1.0. The candidate is then classified:
//!
//! 1. A supplied slot that names nothing: REJECT
//! 2. More than one ambiguous slot: REJECT
//! 3. One ambiguous slot: CLARIFY if the overall confidence reaches the
//!    clarify threshold, else REJECT. The question offers at most
//!    `max_clarify_options` of the best ranked entities
//! 4. Overall at or above the accept threshold: ACCEPT
//! 5. Overall at or above the clarify threshold: CLARIFY
//! 6. Otherwise REJECT

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use haggle_foundation::Intent;
use haggle_grammar::SlotSpec;
use haggle_grammar::matcher::penalized;
use haggle_resolver::{RankedRef, ResolvedCandidate, ResolvedSlot, SlotOrigin};

use crate::config::PolicyConfig;
use crate::diagnostics::{CandidateSummary, RejectionReason};

/// How the policy classifies a candidate.
///
/// Ordered worst to best, so the maximum is the preferred class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Decision {
    /// Hand the input to the fallback interpreter.
    Reject,
    /// Ask the player one question.
    Clarify,
    /// Dispatch the command.
    Accept,
}

/// A resolved candidate with its confidence and classification.
#[derive(Clone, Debug)]
pub struct ScoredCandidate {
    /// The candidate and its slots.
    pub resolved: ResolvedCandidate,
    /// Expected slots neither supplied nor defaulted.
    pub missing_expected: Vec<SlotSpec>,
    /// Grammar confidence after defaults.
    pub effective_grammar: f64,
    /// Overall confidence.
    pub overall: f64,
    /// Classification.
    pub decision: Decision,
    /// Why it was rejected, if it was.
    pub rejection: Option<RejectionReason>,
}

impl ScoredCandidate {
    /// The candidate's intent.
    #[must_use]
    pub fn intent(&self) -> Intent {
        self.resolved.intent()
    }

    /// The matched rule id.
    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.resolved.candidate.rule_id
    }

    /// True if every expected slot was typed by the player.
    #[must_use]
    pub fn satisfied_without_defaults(&self) -> bool {
        self.resolved.candidate.missing_expected.is_empty()
            && self.resolved.slots.values().all(|s| s.origin != SlotOrigin::Defaulted)
    }

    /// A short summary for diagnostics.
    #[must_use]
    pub fn summary(&self) -> CandidateSummary {
        CandidateSummary {
            intent: self.intent(),
            rule_id: self.rule_id().to_string(),
            confidence: self.overall,
            decision: self.decision,
        }
    }
}

/// What a clarification question asks.
#[derive(Clone, Debug, PartialEq)]
pub enum ClarificationTarget {
    /// Pick one entity for an ambiguous slot.
    Slot {
        /// Slot name.
        slot: String,
        /// The options, best first.
        options: Vec<RankedRef>,
    },
    /// Pick one of several readings.
    Intent {
        /// The intents, the winner first.
        options: Vec<Intent>,
    },
    /// Supply an expected slot.
    MissingSlot {
        /// The slot to supply.
        spec: SlotSpec,
    },
    /// Confirm the reading, naming the weakest slot if there is one.
    Confirm {
        /// The slot whose match was weakest.
        slot: Option<String>,
    },
}

/// Scores, classifies and ranks candidates.
#[derive(Clone, Debug, Default)]
pub struct ConfidencePolicy {
    config: PolicyConfig,
}

impl ConfidencePolicy {
    /// Creates a policy.
    #[must_use]
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// The policy's thresholds.
    #[must_use]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Scores and classifies a resolved candidate.
    #[must_use]
    pub fn score(&self, resolved: ResolvedCandidate) -> ScoredCandidate {
        let base = resolved.candidate.base_confidence;
        self.evaluate(resolved, base)
    }

    /// Scores a candidate whose reading the player confirmed.
    ///
    /// The rule's base confidence is replaced by 1.0, unless an expected
    /// slot is still absent: the confirmation said nothing about it, so the
    /// rule keeps its own base.
    #[must_use]
    pub fn score_confirmed(&self, resolved: ResolvedCandidate) -> ScoredCandidate {
        let lacking = resolved
            .candidate
            .missing_expected
            .iter()
            .any(|spec| !resolved.slots.contains_key(&spec.name));
        let base = if lacking { resolved.candidate.base_confidence } else { 1.0 };
        self.evaluate(resolved, base)
    }

    fn evaluate(&self, resolved: ResolvedCandidate, base: f64) -> ScoredCandidate {
        let missing_expected: Vec<SlotSpec> = resolved
            .candidate
            .missing_expected
            .iter()
            .filter(|spec| !resolved.slots.contains_key(&spec.name))
            .cloned()
            .collect();
        let effective_grammar = penalized(base, self.config.missing_expected_penalty, missing_expected.len());
        let weakest = resolved
            .slots
            .values()
            .filter(|s| s.origin != SlotOrigin::Defaulted)
            .map(|s| s.confidence)
            .fold(1.0_f64, f64::min);
        let overall = (effective_grammar * weakest).clamp(0.0, 1.0);

        let (decision, rejection) = self.classify(&resolved, overall);
        tracing::debug!(
            rule = %resolved.candidate.rule_id,
            effective_grammar,
            overall,
            ?decision,
            "scored candidate"
        );

        ScoredCandidate {
            resolved,
            missing_expected,
            effective_grammar,
            overall,
            decision,
            rejection,
        }
    }

    fn classify(&self, resolved: &ResolvedCandidate, overall: f64) -> (Decision, Option<RejectionReason>) {
        if let Some(slot) = resolved.unresolved_slots().find(|s| s.origin != SlotOrigin::Defaulted) {
            return reject(unresolved_reason(slot));
        }

        let ambiguous: Vec<&ResolvedSlot> = resolved.ambiguous_slots().collect();
        match ambiguous.as_slice() {
            [] => {}
            [_] => {
                if overall >= self.config.clarify_threshold {
                    return (Decision::Clarify, None);
                }
                return reject(RejectionReason::LowConfidence { confidence: overall });
            }
            several => {
                return reject(RejectionReason::MultipleAmbiguousSlots {
                    slots: several.iter().map(|s| s.name.clone()).collect(),
                });
            }
        }

        if overall >= self.config.accept_threshold {
            (Decision::Accept, None)
        } else if overall >= self.config.clarify_threshold {
            (Decision::Clarify, None)
        } else {
            reject(RejectionReason::LowConfidence { confidence: overall })
        }
    }

    /// Sorts candidates best first.
    ///
    /// By class, then overall confidence, then: expected slots satisfied
    /// without defaults, longer matched span, more anchor tokens, earlier
    /// rule.
    pub fn rank(&self, candidates: &mut [ScoredCandidate]) {
        candidates.sort_by(compare);
    }

    /// Chooses the question to ask about a CLARIFY winner.
    ///
    /// `others` are the remaining ranked candidates. An ambiguous slot
    /// offers its best `max_clarify_options` entities.
    #[must_use]
    pub fn clarification_target(&self, winner: &ScoredCandidate, others: &[ScoredCandidate]) -> ClarificationTarget {
        if let Some(slot) = winner.resolved.ambiguous_slots().next() {
            return ClarificationTarget::Slot {
                slot: slot.name.clone(),
                options: slot.options().iter().take(self.config.max_clarify_options).cloned().collect(),
            };
        }

        let mut intents = vec![winner.intent()];
        for other in others {
            if intents.len() >= self.config.max_clarify_options {
                break;
            }
            let close = winner.overall - other.overall <= self.config.intent_margin + 1e-9;
            if other.decision != Decision::Reject && close && !intents.contains(&other.intent()) {
                intents.push(other.intent());
            }
        }
        if intents.len() > 1 {
            return ClarificationTarget::Intent { options: intents };
        }

        if let Some(spec) = winner.missing_expected.first() {
            return ClarificationTarget::MissingSlot { spec: spec.clone() };
        }

        let weakest = winner
            .resolved
            .slots
            .values()
            .filter(|s| s.origin == SlotOrigin::Supplied && s.kind.is_entity() && s.confidence < 1.0)
            .min_by(|a, b| a.confidence.total_cmp(&b.confidence));
        ClarificationTarget::Confirm {
            slot: weakest.map(|s| s.name.clone()),
        }
    }
}

fn reject(reason: RejectionReason) -> (Decision, Option<RejectionReason>) {
    (Decision::Reject, Some(reason))
}

fn unresolved_reason(slot: &ResolvedSlot) -> RejectionReason {
    let cause = match &slot.state {
        haggle_resolver::Resolution::Unresolved(cause) => *cause,
        _ => haggle_resolver::UnresolvedCause::NoMatch,
    };
    RejectionReason::UnresolvedSlot {
        slot: slot.name.clone(),
        kind: slot.kind,
        raw: slot.raw.clone(),
        cause,
    }
}

fn compare(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    let (ca, cb) = (&a.resolved.candidate, &b.resolved.candidate);
    b.decision
        .cmp(&a.decision)
        .then_with(|| b.overall.total_cmp(&a.overall))
        .then_with(|| b.satisfied_without_defaults().cmp(&a.satisfied_without_defaults()))
        .then_with(|| cb.matched_span.cmp(&ca.matched_span))
        .then_with(|| cb.anchored_tokens.cmp(&ca.anchored_tokens))
        .then_with(|| ca.rule_order.cmp(&cb.rule_order))
}
