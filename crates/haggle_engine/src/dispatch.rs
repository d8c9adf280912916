//! Dispatch controller.
//!
//! Orchestrates the full flow from raw input to an outcome:
//!
//! ```text
//! Parsing ──▶ Accepted     (dispatch the command)
//!    │
//!    ├──────▶ Clarifying ──▶ Accepted | Rejected   (exactly one follow-up)
//!    │
//!    └──────▶ Rejected     (signal the fallback interpreter)
//! ```
//!
//! The engine is shared between sessions. Its only mutable state is the
//! clarification store and the diagnostics sink; noun indices live for one
//! call.

use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use haggle_foundation::{EntityKind, Intent, ParseContext, Result, SessionId};
use haggle_grammar::{Grammar, Matcher, Ordinal, Token, normalize};
use haggle_grammar::tokenizer::ordinal_word;
use haggle_resolver::{
    ContextProvider, EntityLookup, EntityResolver, RankedRef, ResolvedSlot, SlotOrigin, SlotValue, VocabularyRegistry,
};

use crate::clarification::{ClarificationStore, ClarificationToken, PendingClarification, TakeError};
use crate::command::{CommandSource, ResolvedCommand};
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostic, DiagnosticEvent, DiagnosticSink, NullSink, RejectionReason};
use crate::policy::{ClarificationTarget, ConfidencePolicy, Decision, ScoredCandidate};

/// Words ignored when reading an answer to a question.
const ANSWER_NOISE: &[&str] = &["the", "a", "an", "one", "option", "number", "please", "i", "mean", "meant"];

const YES: &[&str] = &["yes", "y", "yeah", "yep", "sure", "ok", "okay", "correct", "right", "confirm"];
const NO: &[&str] = &["no", "n", "nope", "nah", "cancel", "wrong"];

/// Where a parse call ended up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DispatchState {
    /// Still working.
    Parsing,
    /// A command is ready to dispatch.
    Accepted,
    /// A question was asked.
    Clarifying,
    /// The fallback interpreter should take over.
    Rejected,
}

/// A question for the player.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClarificationRequest {
    /// The session that was asked; only it may answer.
    pub session: SessionId,
    /// The question.
    pub prompt: String,
    /// Pass this to [`Engine::resume_clarification`] with the answer.
    pub token: ClarificationToken,
    /// The choices offered, if any.
    pub options: Vec<String>,
}

/// The result of parsing one input.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParseOutcome {
    /// Dispatch this command.
    Accepted(ResolvedCommand),
    /// Ask the player this question.
    NeedsClarification(ClarificationRequest),
    /// Hand the input to the fallback interpreter.
    Rejected(Diagnostic),
}

impl ParseOutcome {
    /// The dispatch state this outcome represents.
    #[must_use]
    pub fn state(&self) -> DispatchState {
        match self {
            Self::Accepted(_) => DispatchState::Accepted,
            Self::NeedsClarification(_) => DispatchState::Clarifying,
            Self::Rejected(_) => DispatchState::Rejected,
        }
    }

    /// The command, if accepted.
    #[must_use]
    pub fn command(&self) -> Option<&ResolvedCommand> {
        match self {
            Self::Accepted(c) => Some(c),
            _ => None,
        }
    }

    /// The question, if one was asked.
    #[must_use]
    pub fn clarification(&self) -> Option<&ClarificationRequest> {
        match self {
            Self::NeedsClarification(c) => Some(c),
            _ => None,
        }
    }

    /// The diagnostic, if rejected.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Rejected(d) => Some(d),
            _ => None,
        }
    }

    /// Returns true if the fallback interpreter should handle the input.
    #[must_use]
    pub fn signals_fallback(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// The command engine.
///
/// Built once from a compiled grammar and shared by every session.
pub struct Engine {
    grammar: Grammar,
    vocabulary: VocabularyRegistry,
    resolver: EntityResolver,
    policy: ConfidencePolicy,
    config: EngineConfig,
    store: ClarificationStore,
    sink: Arc<dyn DiagnosticSink>,
}

impl Engine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns an invalid configuration error if `config` does not validate.
    pub fn new(grammar: Grammar, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let vocabulary = VocabularyRegistry::new(Arc::new(grammar.verbs.clone()));
        tracing::debug!(rules = grammar.rules.len(), "engine ready");
        Ok(Self {
            vocabulary,
            resolver: EntityResolver::new(config.resolver.clone()),
            policy: ConfidencePolicy::new(config.policy.clone()),
            store: ClarificationStore::new(&config.clarification),
            grammar,
            config,
            sink: Arc::new(NullSink),
        })
    }

    /// Builder method to set the diagnostics sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The compiled grammar.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The vocabulary registry.
    #[must_use]
    pub fn vocabulary(&self) -> &VocabularyRegistry {
        &self.vocabulary
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of questions awaiting an answer.
    #[must_use]
    pub fn pending_clarifications(&self) -> usize {
        self.store.len()
    }

    /// Parses one input.
    ///
    /// Any clarification pending for the session is dropped first. Input
    /// longer than `max_input_tokens` is rejected as malformed before any
    /// rule is tried.
    pub fn parse(&self, raw_text: &str, context: &ParseContext, lookup: &dyn EntityLookup) -> ParseOutcome {
        self.store.supersede(&context.session);

        let tokens = normalize(raw_text);
        if tokens.len() > self.config.policy.max_input_tokens {
            tracing::debug!(tokens = tokens.len(), limit = self.config.policy.max_input_tokens, "input too long");
            return self.reject(Some(&context.session), raw_text, None, None, RejectionReason::MalformedInput);
        }
        if self.grammar.strip(&tokens).is_empty() {
            return self.reject(Some(&context.session), raw_text, None, None, RejectionReason::MalformedInput);
        }

        let matcher = Matcher::new(&self.grammar).with_missing_expected_penalty(self.config.policy.missing_expected_penalty);
        let candidates = matcher.match_tokens(&tokens);
        if candidates.is_empty() {
            return self.reject(Some(&context.session), raw_text, None, None, RejectionReason::NoMatchingRule);
        }

        let mut index = self.vocabulary.index(context, lookup);
        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|c| self.policy.score(self.resolver.resolve(c, context, &mut index)))
            .collect();
        self.policy.rank(&mut scored);
        tracing::debug!(candidates = scored.len(), lookups = index.lookups(), "ranked candidates");

        let winner = scored.remove(0);
        match winner.decision {
            Decision::Accept => self.accept(winner, &context.session, false),
            Decision::Clarify => self.suspend(raw_text, context, winner, scored),
            Decision::Reject => {
                let reason = winner
                    .rejection
                    .clone()
                    .unwrap_or(RejectionReason::LowConfidence { confidence: winner.overall });
                self.reject(Some(&context.session), raw_text, None, Some(&winner), reason)
            }
        }
    }

    /// Parses one input, asking the provider for the session's context.
    pub fn parse_session(
        &self,
        raw_text: &str,
        session: &SessionId,
        provider: &dyn ContextProvider,
        lookup: &dyn EntityLookup,
    ) -> ParseOutcome {
        match provider.context_snapshot(session) {
            Ok(context) => self.parse(raw_text, &context, lookup),
            Err(err) => {
                self.store.supersede(session);
                self.reject(
                    Some(session),
                    raw_text,
                    None,
                    None,
                    RejectionReason::ContextUnavailable {
                        message: err.to_string(),
                    },
                )
            }
        }
    }

    /// Answers a pending question.
    ///
    /// Exactly one answer is accepted per question: the result is either a
    /// dispatchable command or a rejection, never another question. The
    /// token is only honored for the session it was issued to; any other
    /// session gets `UnknownClarification` and the question stays pending.
    pub fn resume_clarification(
        &self,
        session: &SessionId,
        token: &ClarificationToken,
        follow_up: &str,
        lookup: &dyn EntityLookup,
    ) -> ParseOutcome {
        let pending = match self.store.take(session, token, Instant::now()) {
            Ok(pending) => pending,
            Err(TakeError::Unknown) => {
                return self.reject(Some(session), "", Some(follow_up), None, RejectionReason::UnknownClarification);
            }
            Err(TakeError::Expired(session)) => {
                return self.reject(Some(&session), "", Some(follow_up), None, RejectionReason::ClarificationExpired);
            }
        };

        let session = pending.session().clone();
        let raw_input = pending.raw_input.clone();
        let best = pending.winner.clone();

        match self.answer(pending, follow_up, lookup) {
            Ok(rescored) if rescored.decision == Decision::Accept => self.accept(rescored, &session, true),
            Ok(rescored) => self.reject(
                Some(&session),
                &raw_input,
                Some(follow_up),
                Some(&rescored),
                RejectionReason::ClarificationExhausted {
                    confidence: rescored.overall,
                },
            ),
            Err(reason) => self.reject(Some(&session), &raw_input, Some(follow_up), Some(&best), reason),
        }
    }

    fn answer(
        &self,
        pending: PendingClarification,
        follow_up: &str,
        lookup: &dyn EntityLookup,
    ) -> std::result::Result<ScoredCandidate, RejectionReason> {
        let tokens = normalize(follow_up);
        let PendingClarification {
            context,
            winner,
            competitors,
            target,
            ..
        } = pending;

        match target {
            ClarificationTarget::Slot { slot, options } => {
                let chosen = ordinal_answer(&tokens)
                    .and_then(|o| o.index(options.len()))
                    .map(|i| options[i].entity.clone())
                    .or_else(|| self.resolver.resolve_within(&options, follow_up))
                    .ok_or(RejectionReason::UnansweredClarification)?;
                let mut resolved = winner.resolved;
                if let Some(existing) = resolved.slots.remove(&slot) {
                    resolved.slots.insert(slot, existing.clarified(SlotValue::Entity(chosen)));
                }
                Ok(self.policy.score(resolved))
            }
            ClarificationTarget::Intent { options } => {
                let intent = self
                    .intent_answer(&options, &tokens)
                    .ok_or(RejectionReason::UnansweredClarification)?;
                let chosen = std::iter::once(winner)
                    .chain(competitors)
                    .find(|c| c.intent() == intent)
                    .ok_or(RejectionReason::UnansweredClarification)?;
                Ok(self.policy.score_confirmed(chosen.resolved))
            }
            ClarificationTarget::MissingSlot { spec } => {
                let mut resolved = winner.resolved;
                let mut index = self.vocabulary.index(&context, lookup);
                let slot = self.resolver.resolve_text(
                    resolved.intent(),
                    &spec,
                    follow_up,
                    &resolved.slots,
                    &context,
                    &mut index,
                    SlotOrigin::Clarified,
                );
                let value = slot.value().cloned().ok_or(RejectionReason::UnansweredClarification)?;
                resolved.slots.insert(spec.name.clone(), slot.clarified(value));
                Ok(self.policy.score(resolved))
            }
            ClarificationTarget::Confirm { slot } => match yes_no(&tokens) {
                Some(true) => {
                    let mut resolved = winner.resolved;
                    if let Some(name) = slot {
                        if let Some(existing) = resolved.slots.remove(&name) {
                            let confirmed = match existing.value().cloned() {
                                Some(value) => existing.clarified(value),
                                None => existing,
                            };
                            resolved.slots.insert(name, confirmed);
                        }
                    }
                    Ok(self.policy.score_confirmed(resolved))
                }
                Some(false) => Err(RejectionReason::ClarificationDeclined),
                None => Err(RejectionReason::UnansweredClarification),
            },
        }
    }

    fn intent_answer(&self, options: &[Intent], tokens: &[Token]) -> Option<Intent> {
        if let Some(i) = ordinal_answer(tokens).and_then(|o| o.index(options.len())) {
            return options.get(i).copied();
        }
        let words: Vec<&str> = tokens
            .iter()
            .filter_map(Token::as_word)
            .filter(|w| !ANSWER_NOISE.contains(w))
            .collect();
        if words.is_empty() {
            return None;
        }

        let scores: Vec<(Intent, usize)> = options
            .iter()
            .map(|&intent| {
                let mut vocabulary: Vec<String> = intent.label().split_whitespace().map(str::to_string).collect();
                vocabulary.extend(intent.name().split('-').map(str::to_string));
                for verb in self.vocabulary.verbs_for(intent) {
                    vocabulary.extend(verb.split_whitespace().map(str::to_string));
                }
                let hits = words.iter().filter(|w| vocabulary.iter().any(|v| v.as_str() == **w)).count();
                (intent, hits)
            })
            .collect();

        let best = scores.iter().map(|(_, hits)| *hits).max().unwrap_or(0);
        let mut winners = scores.iter().filter(|(_, hits)| *hits == best && best > 0);
        match (winners.next(), winners.next()) {
            (Some((intent, _)), None) => Some(*intent),
            _ => None,
        }
    }

    fn accept(&self, scored: ScoredCandidate, session: &SessionId, clarified: bool) -> ParseOutcome {
        let command = ResolvedCommand {
            intent: scored.intent(),
            rule_id: scored.rule_id().to_string(),
            session: session.clone(),
            slots: scored.resolved.slots,
            overall_confidence: scored.overall,
            source: CommandSource::Code,
            clarified,
        };
        tracing::info!(
            session = %session,
            intent = %command.intent,
            rule = %command.rule_id,
            confidence = command.overall_confidence,
            clarified,
            "command accepted"
        );
        self.sink.record(&DiagnosticEvent::Accepted {
            session: session.clone(),
            intent: command.intent,
            rule_id: command.rule_id.clone(),
            confidence: command.overall_confidence,
            clarified,
        });
        ParseOutcome::Accepted(command)
    }

    fn suspend(
        &self,
        raw_text: &str,
        context: &ParseContext,
        winner: ScoredCandidate,
        competitors: Vec<ScoredCandidate>,
    ) -> ParseOutcome {
        let target = self.policy.clarification_target(&winner, &competitors);
        let (prompt, options) = prompt_for(&target, &winner);
        let token = ClarificationToken::derive(&context.session, raw_text, context);

        tracing::debug!(
            session = %context.session,
            rule = %winner.rule_id(),
            confidence = winner.overall,
            options = options.len(),
            "asking for clarification"
        );
        self.sink.record(&DiagnosticEvent::ClarificationRequested {
            session: context.session.clone(),
            intent: winner.intent(),
            rule_id: winner.rule_id().to_string(),
            options: options.len(),
        });

        let pending = PendingClarification {
            token: token.clone(),
            raw_input: raw_text.to_string(),
            context: context.clone(),
            winner,
            competitors,
            target,
        };
        if let Some(evicted) = self.store.insert(pending, Instant::now()) {
            tracing::warn!(session = %evicted, "clarification store full; dropped oldest question");
        }

        ParseOutcome::NeedsClarification(ClarificationRequest {
            session: context.session.clone(),
            prompt,
            token,
            options,
        })
    }

    fn reject(
        &self,
        session: Option<&SessionId>,
        raw_input: &str,
        follow_up: Option<&str>,
        best: Option<&ScoredCandidate>,
        reason: RejectionReason,
    ) -> ParseOutcome {
        let diagnostic = Diagnostic {
            session: session.cloned(),
            raw_input: raw_input.to_string(),
            follow_up: follow_up.map(str::to_string),
            best_candidate: best.map(ScoredCandidate::summary),
            reason,
        };
        tracing::warn!(
            session = ?diagnostic.session,
            input = %diagnostic.raw_input,
            reason = %diagnostic.reason,
            "input rejected; falling back"
        );
        self.sink.record(&DiagnosticEvent::Rejected(diagnostic.clone()));
        ParseOutcome::Rejected(diagnostic)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("rules", &self.grammar.rules.len())
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

fn ordinal_answer(tokens: &[Token]) -> Option<Ordinal> {
    let content: Vec<&Token> = tokens
        .iter()
        .filter(|t| !t.as_word().is_some_and(|w| ANSWER_NOISE.contains(&w)))
        .collect();
    match content.as_slice() {
        [Token::Number(n)] => usize::try_from(*n).ok().map(Ordinal::Nth),
        [Token::Word(w)] => ordinal_word(w),
        _ => None,
    }
}

fn yes_no(tokens: &[Token]) -> Option<bool> {
    let word = tokens.iter().filter_map(Token::as_word).find(|w| !ANSWER_NOISE.contains(w))?;
    if YES.contains(&word) {
        Some(true)
    } else if NO.contains(&word) {
        Some(false)
    } else {
        None
    }
}

fn kind_noun(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Item => "item",
        EntityKind::Recipe => "recipe",
        EntityKind::Npc => "person",
        EntityKind::Shop => "shop",
        EntityKind::Business => "business",
        EntityKind::Plot => "plot",
        EntityKind::Building => "building",
        EntityKind::Number => "amount",
        EntityKind::Currency => "price",
    }
}

fn or_list(options: &[String]) -> String {
    match options {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

fn names(options: &[RankedRef]) -> Vec<String> {
    options.iter().map(|o| o.entity.display_name.clone()).collect()
}

fn prompt_for(target: &ClarificationTarget, winner: &ScoredCandidate) -> (String, Vec<String>) {
    let intent = winner.intent();
    match target {
        ClarificationTarget::Slot { slot, options } => {
            let kind = winner
                .resolved
                .slots
                .get(slot)
                .map_or(EntityKind::Item, |s: &ResolvedSlot| s.kind);
            let names = names(options);
            let prompt = match kind {
                EntityKind::Item | EntityKind::Recipe | EntityKind::Building => format!(
                    "Which {} do you want to {}: {}?",
                    kind_noun(kind),
                    intent.verb_phrase(),
                    or_list(&names)
                ),
                _ => format!("Which {} do you mean: {}?", kind_noun(kind), or_list(&names)),
            };
            (prompt, names)
        }
        ClarificationTarget::Intent { options } => {
            let labels: Vec<String> = options.iter().map(|i| i.label().to_string()).collect();
            (format!("Do you want to {}?", or_list(&labels)), labels)
        }
        ClarificationTarget::MissingSlot { spec } => {
            let prompt = match spec.kind {
                EntityKind::Number => format!("How many do you want to {}?", intent.verb_phrase()),
                EntityKind::Currency => "For what price?".to_string(),
                kind => format!("Which {} do you want to {}?", kind_noun(kind), intent.verb_phrase()),
            };
            (prompt, Vec::new())
        }
        ClarificationTarget::Confirm { slot } => {
            let named = slot
                .as_ref()
                .and_then(|s| winner.resolved.slots.get(s))
                .and_then(ResolvedSlot::value)
                .map(ToString::to_string);
            let prompt = match named {
                Some(name) => format!("Did you mean {name}? You want to {}.", intent.label()),
                None => format!("Do you want to {}?", intent.label()),
            };
            (prompt, vec!["yes".to_string(), "no".to_string()])
        }
    }
}
