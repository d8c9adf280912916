//! Fully resolved commands.
//!
//! A [`ResolvedCommand`] is what the handler receives, whether the code path
//! produced it or the fallback interpreter did.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use haggle_foundation::{EntityId, EntityKind, Intent, Money, SessionId};
use haggle_resolver::{EntityRef, ResolvedSlot, SlotOrigin, SlotValue};

/// Rule id recorded on commands built by the fallback interpreter.
pub const FALLBACK_RULE_ID: &str = "fallback";

/// Who produced a command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CommandSource {
    /// The grammar and resolver.
    Code,
    /// The general-purpose fallback interpreter.
    Fallback,
}

/// A command whose every slot is resolved.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolvedCommand {
    /// What the player wants.
    pub intent: Intent,
    /// The rule that matched.
    pub rule_id: String,
    /// Session that issued it.
    pub session: SessionId,
    /// Slots by name.
    pub slots: BTreeMap<String, ResolvedSlot>,
    /// Overall confidence.
    pub overall_confidence: f64,
    /// Who produced it.
    pub source: CommandSource,
    /// True if a clarification preceded it.
    pub clarified: bool,
}

impl ResolvedCommand {
    /// Wraps a result of the fallback interpreter.
    #[must_use]
    pub fn from_fallback(
        intent: Intent,
        session: SessionId,
        values: impl IntoIterator<Item = (String, SlotValue)>,
        confidence: f64,
    ) -> Self {
        let slots = values
            .into_iter()
            .map(|(name, value)| {
                let kind = match &value {
                    SlotValue::Entity(e) => e.kind,
                    SlotValue::Quantity(_) => EntityKind::Number,
                    SlotValue::Money(_) => EntityKind::Currency,
                };
                let raw = value.to_string();
                let slot = ResolvedSlot::resolved(name.clone(), kind, value, confidence, raw, SlotOrigin::Supplied);
                (name, slot)
            })
            .collect();
        Self {
            intent,
            rule_id: FALLBACK_RULE_ID.to_string(),
            session,
            slots,
            overall_confidence: confidence.clamp(0.0, 1.0),
            source: CommandSource::Fallback,
            clarified: false,
        }
    }

    /// The slot with the given name.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&ResolvedSlot> {
        self.slots.get(name)
    }

    /// The value of a slot.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&SlotValue> {
        self.slot(name).and_then(ResolvedSlot::value)
    }

    /// The entity a slot refers to.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityRef> {
        self.value(name).and_then(SlotValue::as_entity)
    }

    /// The id of the entity a slot refers to.
    #[must_use]
    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.entity(name).map(|e| e.id)
    }

    /// The count in a slot.
    #[must_use]
    pub fn quantity(&self, name: &str) -> Option<u32> {
        match self.value(name)? {
            SlotValue::Quantity(n) => Some(*n),
            _ => None,
        }
    }

    /// The amount in a slot.
    #[must_use]
    pub fn money(&self, name: &str) -> Option<Money> {
        match self.value(name)? {
            SlotValue::Money(m) => Some(*m),
            _ => None,
        }
    }
}
