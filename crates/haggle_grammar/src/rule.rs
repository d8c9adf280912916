//! Grammar rules, the rule set and the static verb table.

use std::collections::{BTreeMap, BTreeSet};

use haggle_foundation::Intent;

use crate::pattern::{PatternElement, SlotSpec, leaf_counts, slots_of};
use crate::tokenizer::Token;

/// A compiled grammar rule.
#[derive(Clone, Debug, PartialEq)]
pub struct GrammarRule {
    /// Unique rule id (`buy-item/from-shop`).
    pub id: String,
    /// The intent this rule recognizes.
    pub intent: Intent,
    /// Compiled pattern.
    pub elements: Vec<PatternElement>,
    /// Slots in order of appearance.
    pub slots: Vec<SlotSpec>,
    /// Confidence of a full structural match.
    pub base_confidence: f64,
    /// Optional slots whose absence lowers confidence.
    pub expects: Vec<String>,
    /// Optional slots that may be filled from the interaction target.
    pub defaults: Vec<String>,
    /// Declaration order across the whole grammar.
    pub order: usize,
}

impl GrammarRule {
    /// Creates a rule from a compiled pattern.
    #[must_use]
    pub fn new(id: impl Into<String>, intent: Intent, elements: Vec<PatternElement>, base_confidence: f64) -> Self {
        let slots = slots_of(&elements).into_iter().cloned().collect();
        Self {
            id: id.into(),
            intent,
            elements,
            slots,
            base_confidence,
            expects: Vec::new(),
            defaults: Vec::new(),
            order: 0,
        }
    }

    /// Looks up a slot by name.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Specificity: (mandatory leaf elements, total leaf elements).
    ///
    /// Higher is more specific.
    #[must_use]
    pub fn specificity(&self) -> (usize, usize) {
        leaf_counts(&self.elements)
    }

    /// Renders the pattern back to DSL text.
    #[must_use]
    pub fn pattern_text(&self) -> String {
        self.elements
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// All rules of a grammar, grouped by intent.
///
/// Within an intent, rules are kept most-specific first, then in
/// declaration order.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    by_intent: BTreeMap<Intent, Vec<GrammarRule>>,
    len: usize,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, keeping its intent's rules ordered.
    pub fn insert(&mut self, rule: GrammarRule) {
        let rules = self.by_intent.entry(rule.intent).or_default();
        rules.push(rule);
        rules.sort_by(|a, b| {
            b.specificity()
                .cmp(&a.specificity())
                .then_with(|| a.order.cmp(&b.order))
        });
        self.len += 1;
    }

    /// Rules for an intent, in matching order.
    #[must_use]
    pub fn rules_for(&self, intent: Intent) -> &[GrammarRule] {
        self.by_intent.get(&intent).map_or(&[], Vec::as_slice)
    }

    /// Looks up a rule by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&GrammarRule> {
        self.iter().find(|r| r.id == id)
    }

    /// Returns true if a rule with the id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates all rules, grouped by intent.
    pub fn iter(&self) -> impl Iterator<Item = &GrammarRule> {
        self.by_intent.values().flatten()
    }
}

/// Surface verbs for each intent.
///
/// A verb may be several words ("pick up", "how much is"). One surface verb
/// may belong to several intents.
#[derive(Clone, Debug, Default)]
pub struct VerbTable {
    by_intent: BTreeMap<Intent, Vec<Vec<String>>>,
    by_surface: BTreeMap<String, BTreeSet<Intent>>,
}

impl VerbTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a verb for an intent. Returns false for blank verbs.
    pub fn register(&mut self, intent: Intent, verb: &str) -> bool {
        let words: Vec<String> = verb.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return false;
        }
        let surface = words.join(" ");
        if self.by_surface.entry(surface).or_default().insert(intent) {
            let phrases = self.by_intent.entry(intent).or_default();
            phrases.push(words);
            phrases.sort_by(|a, b| b.len().cmp(&a.len()));
        }
        true
    }

    /// Surface verbs registered for an intent.
    #[must_use]
    pub fn verbs_for(&self, intent: Intent) -> BTreeSet<String> {
        self.by_intent
            .get(&intent)
            .map(|phrases| phrases.iter().map(|p| p.join(" ")).collect())
            .unwrap_or_default()
    }

    /// Intents a surface verb belongs to.
    #[must_use]
    pub fn intents_for(&self, surface: &str) -> BTreeSet<Intent> {
        let key = surface.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ");
        self.by_surface.get(&key).cloned().unwrap_or_default()
    }

    /// Returns true if the intent has at least one verb.
    #[must_use]
    pub fn has_verbs(&self, intent: Intent) -> bool {
        self.by_intent.get(&intent).is_some_and(|p| !p.is_empty())
    }

    /// Token counts of the intent's verbs that match at `pos`, longest first.
    #[must_use]
    pub fn match_at(&self, intent: Intent, tokens: &[Token], pos: usize) -> Vec<usize> {
        let Some(phrases) = self.by_intent.get(&intent) else {
            return Vec::new();
        };
        let mut lengths: Vec<usize> = phrases
            .iter()
            .filter(|phrase| phrase_matches(phrase, tokens, pos))
            .map(Vec::len)
            .collect();
        lengths.dedup();
        lengths
    }

    /// Returns true if any verb of any intent starts with this word.
    #[must_use]
    pub fn starts_any(&self, word: &str) -> bool {
        self.by_intent
            .values()
            .flatten()
            .any(|phrase| phrase.first().is_some_and(|w| w == word))
    }
}

fn phrase_matches(phrase: &[String], tokens: &[Token], pos: usize) -> bool {
    phrase.iter().enumerate().all(|(i, word)| {
        tokens
            .get(pos + i)
            .and_then(Token::as_word)
            .is_some_and(|w| w == word)
    })
}

/// A compiled grammar: verbs, rules, fillers and preambles.
#[derive(Clone, Debug, Default)]
pub struct Grammar {
    /// Surface verbs per intent.
    pub verbs: VerbTable,
    /// Rules per intent.
    pub rules: RuleSet,
    /// Politeness words ignored at either end of the input.
    pub fillers: BTreeSet<String>,
    /// Lead-in phrases ignored at the start of the input.
    pub preambles: Vec<Vec<String>>,
}

impl Grammar {
    /// Strips preambles and leading/trailing fillers.
    ///
    /// Returns the remaining token range.
    #[must_use]
    pub fn strip<'t>(&self, tokens: &'t [Token]) -> &'t [Token] {
        let mut rest = tokens;
        loop {
            if let Some(word) = rest.first().and_then(Token::as_word) {
                if self.fillers.contains(word) {
                    rest = &rest[1..];
                    continue;
                }
            }
            if let Some(len) = self
                .preambles
                .iter()
                .find(|p| rest.len() > p.len() && phrase_matches(p, rest, 0))
                .map(Vec::len)
            {
                rest = &rest[len..];
                continue;
            }
            break;
        }
        while let Some(word) = rest.last().and_then(Token::as_word) {
            if !self.fillers.contains(word) {
                break;
            }
            rest = &rest[..rest.len() - 1];
        }
        rest
    }
}
