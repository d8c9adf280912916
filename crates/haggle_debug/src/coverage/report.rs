//! Grammar coverage reports.
//!
//! Aggregates coverage records into per-rule and per-intent counts, the
//! rejection reasons seen, and the inputs no rule matched. The unmatched
//! inputs are what grammar authors look at next.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use haggle_engine::{DiagnosticEvent, RejectionReason};
use haggle_foundation::Intent;

use super::record::CoverageRecord;

/// Counts for one rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCoverage {
    /// Commands accepted through the rule.
    pub accepted: usize,
    /// Questions asked about the rule's candidate.
    pub clarifications: usize,
    /// Rejections where the rule was the best candidate.
    pub rejected: usize,
}

/// Aggregated coverage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Records aggregated.
    pub total: usize,
    /// Accepted commands.
    pub accepted: usize,
    /// Of those, accepted after a clarification.
    pub accepted_after_clarification: usize,
    /// Clarification questions asked.
    pub clarifications: usize,
    /// Rejections.
    pub rejected: usize,
    /// Counts per rule id.
    pub by_rule: BTreeMap<String, RuleCoverage>,
    /// Accepted commands per intent name.
    pub by_intent: BTreeMap<String, usize>,
    /// Rejections per reason code.
    pub rejection_reasons: BTreeMap<String, usize>,
    /// Inputs no rule matched, most frequent first.
    pub unmatched: Vec<(String, usize)>,
}

impl CoverageReport {
    /// Aggregates records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CoverageRecord>) -> Self {
        let mut report = Self::default();
        let mut unmatched: BTreeMap<String, usize> = BTreeMap::new();

        for record in records {
            report.total += 1;
            match &record.event {
                DiagnosticEvent::Accepted {
                    intent,
                    rule_id,
                    clarified,
                    ..
                } => {
                    report.accepted += 1;
                    if *clarified {
                        report.accepted_after_clarification += 1;
                    }
                    report.rule(rule_id).accepted += 1;
                    *report.by_intent.entry(intent.name().to_string()).or_insert(0) += 1;
                }
                DiagnosticEvent::ClarificationRequested { rule_id, .. } => {
                    report.clarifications += 1;
                    report.rule(rule_id).clarifications += 1;
                }
                DiagnosticEvent::Rejected(diagnostic) => {
                    report.rejected += 1;
                    if let Some(best) = &diagnostic.best_candidate {
                        report.rule(&best.rule_id).rejected += 1;
                    }
                    *report
                        .rejection_reasons
                        .entry(diagnostic.reason.code().to_string())
                        .or_insert(0) += 1;
                    if diagnostic.reason == RejectionReason::NoMatchingRule {
                        let key = diagnostic.raw_input.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
                        *unmatched.entry(key).or_insert(0) += 1;
                    }
                }
            }
        }

        let mut unmatched: Vec<(String, usize)> = unmatched.into_iter().collect();
        unmatched.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        report.unmatched = unmatched;
        report
    }

    fn rule(&mut self, rule_id: &str) -> &mut RuleCoverage {
        self.by_rule.entry(rule_id.to_string()).or_default()
    }

    /// Share of final outcomes that were accepted, in `[0, 1]`.
    ///
    /// Questions are not outcomes; a question followed by an answer shows
    /// up once, as an acceptance or a rejection.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn acceptance_rate(&self) -> f64 {
        let outcomes = self.accepted + self.rejected;
        if outcomes == 0 {
            return 0.0;
        }
        self.accepted as f64 / outcomes as f64
    }

    /// Intents that no accepted command used.
    #[must_use]
    pub fn unused_intents(&self) -> Vec<Intent> {
        Intent::ALL
            .into_iter()
            .filter(|i| !self.by_intent.contains_key(i.name()))
            .collect()
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} events: {} accepted ({} after a question), {} questions, {} rejected ({:.0}% accepted)",
            self.total,
            self.accepted,
            self.accepted_after_clarification,
            self.clarifications,
            self.rejected,
            self.acceptance_rate() * 100.0
        )?;

        if !self.by_rule.is_empty() {
            writeln!(f, "\n{:<40} {:>8} {:>8} {:>8}", "rule", "accept", "clarify", "reject")?;
            for (rule, counts) in &self.by_rule {
                writeln!(
                    f,
                    "{rule:<40} {:>8} {:>8} {:>8}",
                    counts.accepted, counts.clarifications, counts.rejected
                )?;
            }
        }

        if !self.rejection_reasons.is_empty() {
            writeln!(f, "\nrejections:")?;
            for (code, count) in &self.rejection_reasons {
                writeln!(f, "  {code:<30} {count}")?;
            }
        }

        if !self.unmatched.is_empty() {
            writeln!(f, "\nunmatched inputs:")?;
            for (input, count) in self.unmatched.iter().take(20) {
                writeln!(f, "  {count:>4}  {input}")?;
            }
        }

        let unused = self.unused_intents();
        if !unused.is_empty() {
            let names: Vec<&str> = unused.iter().map(|i| i.name()).collect();
            writeln!(f, "\nnever accepted: {}", names.join(", "))?;
        }
        Ok(())
    }
}
