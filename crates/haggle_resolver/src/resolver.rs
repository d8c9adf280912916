//! Entity resolution.
//!
//! Turns a candidate's raw slot text into typed values: entity references
//! for entity kinds, counts for `number` slots and amounts for `price` slots.
//!
//! Resolution policy for entity slots:
//!
//! 1. A unique exact name match resolves with confidence 1.0
//! 2. Several exact matches are ambiguous
//! 3. A single match above the fuzzy threshold resolves with its score
//! 4. Several matches above the threshold are ambiguous, ranked
//! 5. Nothing above the threshold is unresolved
//!
//! Before this, if context entities (the shop's stock, known recipes, ...)
//! compete with world-only entities and the best world score is within the
//! context priority margin, only the context entities are kept.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use haggle_foundation::{Currency, EntityId, EntityKind, Intent, Money, ParseContext};
use haggle_grammar::{ExtractionStrategy, ParseCandidate, RawSlot, SlotSpec, Token, normalize};

use crate::config::ResolverConfig;
use crate::fuzzy::{MatchKind, SurfaceKey, score};
use crate::vocabulary::{NounCandidates, NounIndex, VocabularyRegistry};

const SCORE_EPSILON: f64 = 1e-9;

/// A resolved world entity.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityRef {
    /// Entity id.
    pub id: EntityId,
    /// Entity kind.
    pub kind: EntityKind,
    /// Name shown to players.
    pub display_name: String,
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// The typed value of a resolved slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SlotValue {
    /// A world entity.
    Entity(EntityRef),
    /// A count.
    Quantity(u32),
    /// An amount of money.
    Money(Money),
}

impl SlotValue {
    /// The entity, if this is an entity value.
    #[must_use]
    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Entity(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(e) => write!(f, "{e}"),
            Self::Quantity(n) => write!(f, "{n}"),
            Self::Money(m) => write!(f, "{m}"),
        }
    }
}

/// One option of an ambiguous slot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankedRef {
    /// The entity.
    pub entity: EntityRef,
    /// Its best similarity score.
    pub score: f64,
    /// How the best score was obtained.
    pub matched_by: MatchKind,
    /// True if the entity is in the player's context.
    pub in_context: bool,
}

/// Why a slot could not be resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnresolvedCause {
    /// No entity is named like that.
    NoMatch,
    /// The lookup service failed.
    CollaboratorUnavailable,
    /// The value could not be parsed (zero quantity, missing amount).
    InvalidValue,
}

impl fmt::Display for UnresolvedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoMatch => "no match",
            Self::CollaboratorUnavailable => "lookup unavailable",
            Self::InvalidValue => "invalid value",
        })
    }
}

/// Outcome of resolving one slot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Resolution {
    /// A single value.
    Resolved(SlotValue),
    /// Several entities fit, best first.
    Ambiguous(Vec<RankedRef>),
    /// Nothing fits.
    Unresolved(UnresolvedCause),
}

/// Where a slot's value came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SlotOrigin {
    /// Typed by the player.
    Supplied,
    /// Filled from the interaction target.
    Defaulted,
    /// Answered in a clarification turn.
    Clarified,
}

/// A slot after resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedSlot {
    /// Slot name.
    pub name: String,
    /// Slot kind.
    pub kind: EntityKind,
    /// Resolution outcome.
    pub state: Resolution,
    /// Resolution confidence in `[0, 1]`.
    pub confidence: f64,
    /// The text it was resolved from.
    pub raw: String,
    /// Where the value came from.
    pub origin: SlotOrigin,
}

impl ResolvedSlot {
    /// Creates a resolved slot.
    #[must_use]
    pub fn resolved(
        name: impl Into<String>,
        kind: EntityKind,
        value: SlotValue,
        confidence: f64,
        raw: impl Into<String>,
        origin: SlotOrigin,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            state: Resolution::Resolved(value),
            confidence,
            raw: raw.into(),
            origin,
        }
    }

    fn unresolved(name: &str, kind: EntityKind, cause: UnresolvedCause, raw: &str, origin: SlotOrigin) -> Self {
        Self {
            name: name.to_string(),
            kind,
            state: Resolution::Unresolved(cause),
            confidence: 0.0,
            raw: raw.to_string(),
            origin,
        }
    }

    /// Returns true if the slot has a single value.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, Resolution::Resolved(_))
    }

    /// Returns true if several entities fit.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self.state, Resolution::Ambiguous(_))
    }

    /// Returns true if nothing fits.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self.state, Resolution::Unresolved(_))
    }

    /// The value, if resolved.
    #[must_use]
    pub fn value(&self) -> Option<&SlotValue> {
        match &self.state {
            Resolution::Resolved(v) => Some(v),
            _ => None,
        }
    }

    /// The ranked options, if ambiguous.
    #[must_use]
    pub fn options(&self) -> &[RankedRef] {
        match &self.state {
            Resolution::Ambiguous(options) => options,
            _ => &[],
        }
    }

    /// Replaces the state with a value the player confirmed.
    #[must_use]
    pub fn clarified(mut self, value: SlotValue) -> Self {
        self.state = Resolution::Resolved(value);
        self.confidence = 1.0;
        self.origin = SlotOrigin::Clarified;
        self
    }
}

/// A candidate together with its resolved slots.
#[derive(Clone, Debug)]
pub struct ResolvedCandidate {
    /// The structural match.
    pub candidate: ParseCandidate,
    /// Resolved slots by name (supplied and defaulted).
    pub slots: BTreeMap<String, ResolvedSlot>,
}

impl ResolvedCandidate {
    /// The intent of the candidate.
    #[must_use]
    pub fn intent(&self) -> Intent {
        self.candidate.intent
    }

    /// Slots that are ambiguous.
    pub fn ambiguous_slots(&self) -> impl Iterator<Item = &ResolvedSlot> {
        self.slots.values().filter(|s| s.is_ambiguous())
    }

    /// Slots that are unresolved.
    pub fn unresolved_slots(&self) -> impl Iterator<Item = &ResolvedSlot> {
        self.slots.values().filter(|s| s.is_unresolved())
    }

    /// The resolved entity id of a slot.
    #[must_use]
    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.slots
            .get(name)
            .and_then(ResolvedSlot::value)
            .and_then(SlotValue::as_entity)
            .map(|e| e.id)
    }

    /// The first resolved shop, used to scope item lookups.
    #[must_use]
    pub fn resolved_shop(&self) -> Option<EntityId> {
        resolved_shop(&self.slots)
    }
}

/// Resolves slots against a noun index.
#[derive(Clone, Debug, Default)]
pub struct EntityResolver {
    config: ResolverConfig,
}

impl EntityResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// The resolver's configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves every supplied slot and fills context defaults.
    ///
    /// Slots are processed in [`EntityKind::RESOLUTION_ORDER`] so that item
    /// lookups can be scoped by an already resolved shop.
    pub fn resolve(&self, candidate: ParseCandidate, context: &ParseContext, index: &mut NounIndex<'_>) -> ResolvedCandidate {
        enum Pending<'c> {
            Supplied(&'c RawSlot),
            Default(&'c SlotSpec),
        }

        let mut pending: Vec<(EntityKind, &str, Pending<'_>)> = candidate
            .raw_slots
            .values()
            .map(|raw| (raw.kind, raw.name.as_str(), Pending::Supplied(raw)))
            .chain(
                candidate
                    .defaultable
                    .iter()
                    .map(|spec| (spec.kind, spec.name.as_str(), Pending::Default(spec))),
            )
            .collect();
        pending.sort_by(|a, b| {
            a.0.resolution_rank()
                .cmp(&b.0.resolution_rank())
                .then_with(|| a.1.cmp(b.1))
        });

        let mut slots = BTreeMap::new();
        for (_, _, item) in pending {
            let slot = match item {
                Pending::Supplied(raw) => {
                    Some(self.resolve_raw(candidate.intent, raw, &slots, context, index))
                }
                Pending::Default(spec) => Self::default_slot(spec, context, index),
            };
            if let Some(slot) = slot {
                tracing::debug!(
                    rule = %candidate.rule_id,
                    slot = %slot.name,
                    raw = %slot.raw,
                    state = ?slot.state,
                    confidence = slot.confidence,
                    "resolved slot"
                );
                slots.insert(slot.name.clone(), slot);
            }
        }

        ResolvedCandidate { candidate, slots }
    }

    /// Resolves free text for a slot, e.g. a clarification answer.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve_text(
        &self,
        intent: Intent,
        spec: &SlotSpec,
        text: &str,
        resolved: &BTreeMap<String, ResolvedSlot>,
        context: &ParseContext,
        index: &mut NounIndex<'_>,
        origin: SlotOrigin,
    ) -> ResolvedSlot {
        let tokens = normalize(text);
        let start = tokens.iter().position(|t| t.as_number().is_some()).unwrap_or(0);
        let raw = RawSlot {
            name: spec.name.clone(),
            kind: spec.kind,
            strategy: spec.strategy,
            text: text.trim().to_lowercase(),
            tokens: tokens[start.min(tokens.len())..].to_vec(),
            start: 0,
            end: tokens.len(),
            optional: spec.optional,
        };
        let mut slot = self.resolve_raw(intent, &raw, resolved, context, index);
        slot.origin = origin;
        slot
    }

    /// Picks the option a follow-up answer names, if exactly one fits.
    ///
    /// Tries exact names, then a unique fuzzy match, then words that appear
    /// in only one option ("the mana one").
    #[must_use]
    pub fn resolve_within(&self, options: &[RankedRef], text: &str) -> Option<EntityRef> {
        let query = SurfaceKey::new(text);
        if query.is_empty() {
            return None;
        }
        let keys: Vec<SurfaceKey> = options.iter().map(|o| SurfaceKey::new(&o.entity.display_name)).collect();

        let exact: Vec<usize> = (0..options.len()).filter(|&i| keys[i] == query).collect();
        if let [only] = exact.as_slice() {
            return Some(options[*only].entity.clone());
        }

        let fitting: Vec<(usize, f64)> = keys
            .iter()
            .enumerate()
            .filter_map(|(i, key)| score(&query, key, &self.config).map(|m| (i, m.score)))
            .filter(|(_, s)| *s >= self.config.fuzzy_threshold)
            .collect();
        if let [(only, _)] = fitting.as_slice() {
            return Some(options[*only].entity.clone());
        }

        let mut picked = BTreeSet::new();
        for word in query.words() {
            let holders: Vec<usize> = (0..options.len())
                .filter(|&i| keys[i].words().iter().any(|w| w == word))
                .collect();
            if let [only] = holders.as_slice() {
                picked.insert(*only);
            }
        }
        match picked.len() {
            1 => picked.first().map(|i| options[*i].entity.clone()),
            _ => None,
        }
    }

    /// Scores every indexed noun against `text`, keeping matches above the
    /// threshold (best per entity), after applying context priority.
    #[must_use]
    pub fn rank(&self, text: &str, candidates: &NounCandidates) -> Vec<RankedRef> {
        let query = SurfaceKey::new(text);
        let mut best: BTreeMap<EntityId, RankedRef> = BTreeMap::new();

        for noun in &candidates.nouns {
            let Some(m) = score(&query, &noun.key, &self.config) else {
                continue;
            };
            if m.kind != MatchKind::Exact && m.score < self.config.fuzzy_threshold {
                continue;
            }
            let better = best.get(&noun.id).is_none_or(|current| {
                (m.kind == MatchKind::Exact && current.matched_by != MatchKind::Exact) || m.score > current.score
            });
            if better {
                best.insert(
                    noun.id,
                    RankedRef {
                        entity: EntityRef {
                            id: noun.id,
                            kind: noun.kind,
                            display_name: noun.display_name.clone(),
                        },
                        score: m.score,
                        matched_by: m.kind,
                        in_context: noun.in_context,
                    },
                );
            }
        }

        let mut ranked: Vec<RankedRef> = best.into_values().collect();

        let top = |in_context: bool| {
            ranked
                .iter()
                .filter(|r| r.in_context == in_context)
                .map(|r| r.score)
                .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))))
        };
        if let (Some(context_best), Some(world_best)) = (top(true), top(false)) {
            if world_best - context_best <= self.config.context_priority_margin + SCORE_EPSILON {
                ranked.retain(|r| r.in_context);
            }
        }

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.in_context.cmp(&a.in_context))
                .then_with(|| a.entity.display_name.cmp(&b.entity.display_name))
                .then_with(|| a.entity.id.cmp(&b.entity.id))
        });
        ranked
    }

    fn resolve_raw(
        &self,
        intent: Intent,
        raw: &RawSlot,
        resolved: &BTreeMap<String, ResolvedSlot>,
        context: &ParseContext,
        index: &mut NounIndex<'_>,
    ) -> ResolvedSlot {
        let origin = SlotOrigin::Supplied;
        match raw.strategy {
            ExtractionStrategy::Number => match quantity(&raw.tokens) {
                Some(n) => ResolvedSlot::resolved(&raw.name, raw.kind, SlotValue::Quantity(n), 1.0, &raw.text, origin),
                None => ResolvedSlot::unresolved(&raw.name, raw.kind, UnresolvedCause::InvalidValue, &raw.text, origin),
            },
            ExtractionStrategy::Money => match money(&raw.tokens) {
                Some(m) => ResolvedSlot::resolved(&raw.name, raw.kind, SlotValue::Money(m), 1.0, &raw.text, origin),
                None => ResolvedSlot::unresolved(&raw.name, raw.kind, UnresolvedCause::InvalidValue, &raw.text, origin),
            },
            ExtractionStrategy::Span => {
                let scopes = VocabularyRegistry::context_scopes(context, raw.kind, intent, resolved_shop(resolved));
                let candidates = index.candidate_entities(raw.kind, &scopes);
                if candidates.unavailable {
                    return ResolvedSlot::unresolved(
                        &raw.name,
                        raw.kind,
                        UnresolvedCause::CollaboratorUnavailable,
                        &raw.text,
                        origin,
                    );
                }
                let ranked = self.rank(&raw.text, &candidates);
                Self::decide(&raw.name, raw.kind, &raw.text, ranked)
            }
        }
    }

    fn decide(name: &str, kind: EntityKind, raw: &str, ranked: Vec<RankedRef>) -> ResolvedSlot {
        let mut exact: Vec<RankedRef> = ranked
            .iter()
            .filter(|r| r.matched_by == MatchKind::Exact)
            .cloned()
            .collect();

        let (state, confidence) = match (exact.len(), ranked.len()) {
            (_, 0) => {
                return ResolvedSlot::unresolved(name, kind, UnresolvedCause::NoMatch, raw, SlotOrigin::Supplied);
            }
            (1, _) => (Resolution::Resolved(SlotValue::Entity(exact.remove(0).entity)), 1.0),
            (0, 1) => (
                Resolution::Resolved(SlotValue::Entity(ranked[0].entity.clone())),
                ranked[0].score,
            ),
            (0, _) => {
                let confidence = ranked[0].score;
                (Resolution::Ambiguous(ranked), confidence)
            }
            (_, _) => (Resolution::Ambiguous(exact), 1.0),
        };

        ResolvedSlot {
            name: name.to_string(),
            kind,
            state,
            confidence,
            raw: raw.to_string(),
            origin: SlotOrigin::Supplied,
        }
    }

    fn default_slot(spec: &SlotSpec, context: &ParseContext, index: &mut NounIndex<'_>) -> Option<ResolvedSlot> {
        let id = match spec.kind {
            EntityKind::Shop => context.active_shop(),
            EntityKind::Npc => context.active_npc(),
            _ => None,
        }?;
        let display_name = index.name_of(spec.kind, id).unwrap_or_else(|| id.to_string());
        Some(ResolvedSlot::resolved(
            &spec.name,
            spec.kind,
            SlotValue::Entity(EntityRef {
                id,
                kind: spec.kind,
                display_name,
            }),
            1.0,
            "",
            SlotOrigin::Defaulted,
        ))
    }
}

fn resolved_shop(slots: &BTreeMap<String, ResolvedSlot>) -> Option<EntityId> {
    slots
        .values()
        .filter(|s| s.kind == EntityKind::Shop)
        .filter_map(ResolvedSlot::value)
        .find_map(SlotValue::as_entity)
        .map(|e| e.id)
}

fn quantity(tokens: &[Token]) -> Option<u32> {
    let n = tokens.first()?.as_number()?;
    if n == 0 {
        return None;
    }
    u32::try_from(n).ok()
}

fn money(tokens: &[Token]) -> Option<Money> {
    let amount = tokens.first()?.as_number()?;
    let currency = match tokens.get(1) {
        Some(Token::Currency(c)) => *c,
        Some(Token::Word(w)) => Currency::from_suffix(w).unwrap_or_default(),
        _ => Currency::default(),
    };
    Some(Money::new(amount, currency))
}
