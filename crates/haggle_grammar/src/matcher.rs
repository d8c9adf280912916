//! Matches token streams against the rule set.
//!
//! For every intent, the rules are tried most-specific first and the first
//! rule that matches wins for that intent. Several intents may each yield a
//! candidate; choosing between them is left to the confidence policy.
//!
//! A match is anchored at both ends: every token (after stripping preambles
//! and fillers) must be consumed.

use std::collections::BTreeMap;

use haggle_foundation::{Currency, EntityKind, Intent};

use crate::pattern::{ExtractionStrategy, PatternElement, SlotSpec, first_leaves};
use crate::rule::{Grammar, GrammarRule};
use crate::tokenizer::{Token, join_tokens, normalize};

/// Confidence lost for each expected slot that is absent.
pub const DEFAULT_MISSING_EXPECTED_PENALTY: f64 = 0.05;

/// Words skipped at the start of a span slot.
const DETERMINERS: &[&str] = &["the", "a", "an", "some", "my"];

/// Words allowed after a money amount.
const MONEY_NOUNS: &[&str] = &["coins", "coin", "pieces", "piece"];

/// Text extracted for a slot.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSlot {
    /// Slot name.
    pub name: String,
    /// Declared kind.
    pub kind: EntityKind,
    /// How the text was extracted.
    pub strategy: ExtractionStrategy,
    /// The extracted tokens.
    pub tokens: Vec<Token>,
    /// The extracted tokens joined by spaces.
    pub text: String,
    /// Start index in the stripped token stream.
    pub start: usize,
    /// End index (exclusive) in the stripped token stream.
    pub end: usize,
    /// True if the slot sits in an optional segment.
    pub optional: bool,
}

/// A rule that structurally matched the input.
#[derive(Clone, Debug)]
pub struct ParseCandidate {
    /// Intent of the matched rule.
    pub intent: Intent,
    /// Id of the matched rule.
    pub rule_id: String,
    /// Declaration order of the matched rule.
    pub rule_order: usize,
    /// Slots supplied by the input, by name.
    pub raw_slots: BTreeMap<String, RawSlot>,
    /// The rule's base confidence.
    pub base_confidence: f64,
    /// Expected slots the input did not supply.
    pub missing_expected: Vec<SlotSpec>,
    /// Context-fillable slots the input did not supply.
    pub defaultable: Vec<SlotSpec>,
    /// Base confidence reduced for each missing expected slot.
    pub grammar_confidence: f64,
    /// Tokens bound to pattern elements.
    pub matched_span: usize,
    /// Tokens bound to verbs and fixed words.
    pub anchored_tokens: usize,
}

impl ParseCandidate {
    /// The raw slot with the given name, if supplied.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&RawSlot> {
        self.raw_slots.get(name)
    }

    /// Returns true if the input supplied the slot.
    #[must_use]
    pub fn supplies(&self, name: &str) -> bool {
        self.raw_slots.contains_key(name)
    }
}

#[derive(Default)]
struct MatchState {
    slots: Vec<RawSlot>,
    anchored: usize,
}

/// Matches input against a grammar.
pub struct Matcher<'g> {
    grammar: &'g Grammar,
    missing_expected_penalty: f64,
}

impl<'g> Matcher<'g> {
    /// Creates a matcher with the default missing-slot penalty.
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            missing_expected_penalty: DEFAULT_MISSING_EXPECTED_PENALTY,
        }
    }

    /// Sets the confidence penalty for each absent expected slot.
    #[must_use]
    pub fn with_missing_expected_penalty(mut self, penalty: f64) -> Self {
        self.missing_expected_penalty = penalty;
        self
    }

    /// Normalizes and matches raw input.
    #[must_use]
    pub fn match_input(&self, input: &str) -> Vec<ParseCandidate> {
        self.match_tokens(&normalize(input))
    }

    /// Matches tokens, returning at most one candidate per intent.
    #[must_use]
    pub fn match_tokens(&self, tokens: &[Token]) -> Vec<ParseCandidate> {
        let body = self.grammar.strip(tokens);
        if body.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for intent in Intent::ALL {
            for rule in self.grammar.rules.rules_for(intent) {
                if let Some(candidate) = self.match_rule(rule, body) {
                    tracing::debug!(
                        rule = %candidate.rule_id,
                        intent = %candidate.intent,
                        confidence = candidate.grammar_confidence,
                        slots = candidate.raw_slots.len(),
                        "rule matched"
                    );
                    candidates.push(candidate);
                    break;
                }
            }
        }
        candidates
    }

    /// Attempts a single rule against stripped tokens.
    #[must_use]
    pub fn match_rule(&self, rule: &GrammarRule, tokens: &[Token]) -> Option<ParseCandidate> {
        let mut state = MatchState::default();
        if !self.walk(&[rule.elements.as_slice()], tokens, 0, &mut state) {
            return None;
        }

        let matched_span = state.anchored + state.slots.iter().map(|s| s.end - s.start).sum::<usize>();
        let raw_slots: BTreeMap<String, RawSlot> =
            state.slots.into_iter().map(|s| (s.name.clone(), s)).collect();

        let unsupplied = |names: &[String]| -> Vec<SlotSpec> {
            names
                .iter()
                .filter(|n| !raw_slots.contains_key(n.as_str()))
                .filter_map(|n| rule.slot(n).cloned())
                .collect()
        };
        let missing_expected = unsupplied(&rule.expects);
        let defaultable = unsupplied(&rule.defaults);
        let grammar_confidence =
            penalized(rule.base_confidence, self.missing_expected_penalty, missing_expected.len());

        Some(ParseCandidate {
            intent: rule.intent,
            rule_id: rule.id.clone(),
            rule_order: rule.order,
            raw_slots,
            base_confidence: rule.base_confidence,
            missing_expected,
            defaultable,
            grammar_confidence,
            matched_span,
            anchored_tokens: state.anchored,
        })
    }

    /// Matches the concatenation of `parts` against `tokens[pos..]`.
    fn walk(&self, parts: &[&[PatternElement]], tokens: &[Token], pos: usize, state: &mut MatchState) -> bool {
        let Some(index) = parts.iter().position(|p| !p.is_empty()) else {
            return pos == tokens.len();
        };
        let Some((element, rest)) = parts[index].split_first() else {
            return false;
        };
        let mut next = Vec::with_capacity(parts.len() - index);
        next.push(rest);
        next.extend_from_slice(&parts[index + 1..]);

        match element {
            PatternElement::Verb(intent) => {
                for len in self.grammar.verbs.match_at(*intent, tokens, pos) {
                    state.anchored += len;
                    if self.walk(&next, tokens, pos + len, state) {
                        return true;
                    }
                    state.anchored -= len;
                }
                false
            }
            PatternElement::Literal(words) => {
                let hit = tokens
                    .get(pos)
                    .and_then(Token::as_word)
                    .is_some_and(|w| words.iter().any(|a| a == w));
                if !hit {
                    return false;
                }
                state.anchored += 1;
                if self.walk(&next, tokens, pos + 1, state) {
                    return true;
                }
                state.anchored -= 1;
                false
            }
            PatternElement::Optional(inner) => {
                let mut with = Vec::with_capacity(next.len() + 1);
                with.push(inner.as_slice());
                with.extend_from_slice(&next);
                self.walk(&with, tokens, pos, state) || self.walk(&next, tokens, pos, state)
            }
            PatternElement::Slot(spec) => {
                let (start, ends) = match spec.strategy {
                    ExtractionStrategy::Number => {
                        let ends = match tokens.get(pos).and_then(Token::as_number) {
                            Some(_) => vec![pos + 1],
                            None => Vec::new(),
                        };
                        (pos, ends)
                    }
                    ExtractionStrategy::Money => (pos, money_ends(tokens, pos)),
                    ExtractionStrategy::Span => {
                        let start = skip_determiners(tokens, pos);
                        (start, self.span_ends(tokens, start, &next))
                    }
                };
                for end in ends {
                    state.slots.push(raw_slot(spec, tokens, start, end));
                    if self.walk(&next, tokens, end, state) {
                        return true;
                    }
                    state.slots.pop();
                }
                false
            }
        }
    }

    /// Candidate ends for a span starting at `start`, shortest first.
    ///
    /// A span may only end at the end of input or where the rest of the
    /// pattern can begin, and must contain a nominal token.
    fn span_ends(&self, tokens: &[Token], start: usize, rest: &[&[PatternElement]]) -> Vec<usize> {
        let (anchors, nullable) = first_leaves(rest);
        let mut ends = Vec::new();
        let mut nominal = false;
        for end in start + 1..=tokens.len() {
            nominal |= tokens[end - 1].is_nominal();
            if !nominal {
                continue;
            }
            let boundary = if end == tokens.len() {
                nullable
            } else {
                anchors.iter().any(|a| self.can_begin(a, tokens, end))
            };
            if boundary {
                ends.push(end);
            }
        }
        ends
    }

    fn can_begin(&self, leaf: &PatternElement, tokens: &[Token], pos: usize) -> bool {
        let Some(token) = tokens.get(pos) else {
            return false;
        };
        match leaf {
            PatternElement::Verb(intent) => !self.grammar.verbs.match_at(*intent, tokens, pos).is_empty(),
            PatternElement::Literal(words) => token.as_word().is_some_and(|w| words.iter().any(|a| a == w)),
            PatternElement::Slot(spec) => match spec.strategy {
                ExtractionStrategy::Number | ExtractionStrategy::Money => token.as_number().is_some(),
                ExtractionStrategy::Span => true,
            },
            PatternElement::Optional(_) => false,
        }
    }
}

/// `base × (1 − penalty)^missing`.
#[must_use]
pub fn penalized(base: f64, penalty: f64, missing: usize) -> f64 {
    let factor = (1.0 - penalty).clamp(0.0, 1.0);
    let exponent = i32::try_from(missing).unwrap_or(i32::MAX);
    (base * factor.powi(exponent)).clamp(0.0, 1.0)
}

fn skip_determiners(tokens: &[Token], pos: usize) -> usize {
    let mut start = pos;
    while let Some(w) = tokens.get(start).and_then(Token::as_word) {
        if !DETERMINERS.contains(&w) {
            break;
        }
        start += 1;
    }
    start
}

/// Possible ends of a money amount at `pos`, longest first.
fn money_ends(tokens: &[Token], pos: usize) -> Vec<usize> {
    if tokens.get(pos).and_then(Token::as_number).is_none() {
        return Vec::new();
    }
    let mut ends = vec![pos + 1];
    let mut end = pos + 1;
    if tokens.get(end).is_some_and(is_currency) {
        end += 1;
        ends.push(end);
    }
    if tokens
        .get(end)
        .and_then(Token::as_word)
        .is_some_and(|w| MONEY_NOUNS.contains(&w))
    {
        ends.push(end + 1);
    }
    ends.reverse();
    ends
}

fn is_currency(token: &Token) -> bool {
    match token {
        Token::Currency(_) => true,
        Token::Word(w) => w.len() > 1 && Currency::from_suffix(w).is_some(),
        _ => false,
    }
}

fn raw_slot(spec: &SlotSpec, tokens: &[Token], start: usize, end: usize) -> RawSlot {
    let slice = &tokens[start..end];
    RawSlot {
        name: spec.name.clone(),
        kind: spec.kind,
        strategy: spec.strategy,
        tokens: slice.to_vec(),
        text: join_tokens(slice),
        start,
        end,
        optional: spec.optional,
    }
}
