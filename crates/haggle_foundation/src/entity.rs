//! Entity identifiers and entity kinds.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier for a world entity, issued by the world-state collaborator.
///
/// The engine never interprets the number; it only compares and hands it back.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity ID from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value of this ID.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of thing a slot refers to.
///
/// Entity kinds are resolved against the world; `Number` and `Currency`
/// are value kinds parsed directly from the input.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum EntityKind {
    /// A tradeable item.
    Item,
    /// A crafting recipe.
    Recipe,
    /// A non-player character.
    Npc,
    /// A shop that buys and sells.
    Shop,
    /// A player-owned business.
    Business,
    /// A plot of land.
    Plot,
    /// A constructible building blueprint.
    Building,
    /// A plain count.
    Number,
    /// An amount of money.
    Currency,
}

impl EntityKind {
    /// All kinds, in resolution dependency order.
    ///
    /// Containers (shops, npcs, businesses) come before the things scoped by
    /// them, so an item can be looked up in the shop that was already resolved.
    pub const RESOLUTION_ORDER: [EntityKind; 9] = [
        EntityKind::Shop,
        EntityKind::Npc,
        EntityKind::Business,
        EntityKind::Plot,
        EntityKind::Building,
        EntityKind::Recipe,
        EntityKind::Item,
        EntityKind::Number,
        EntityKind::Currency,
    ];

    /// Returns the DSL name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Recipe => "recipe",
            Self::Npc => "npc",
            Self::Shop => "shop",
            Self::Business => "business",
            Self::Plot => "plot",
            Self::Building => "building",
            Self::Number => "number",
            Self::Currency => "price",
        }
    }

    /// Returns true for kinds that are looked up in the world.
    #[must_use]
    pub const fn is_entity(self) -> bool {
        !matches!(self, Self::Number | Self::Currency)
    }

    /// Returns true for kinds a rule may fill from the interaction target.
    #[must_use]
    pub const fn is_context_fillable(self) -> bool {
        matches!(self, Self::Shop | Self::Npc)
    }

    /// Position in [`Self::RESOLUTION_ORDER`].
    #[must_use]
    pub fn resolution_rank(self) -> usize {
        Self::RESOLUTION_ORDER
            .iter()
            .position(|k| *k == self)
            .unwrap_or(Self::RESOLUTION_ORDER.len())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item" => Ok(Self::Item),
            "recipe" => Ok(Self::Recipe),
            "npc" => Ok(Self::Npc),
            "shop" => Ok(Self::Shop),
            "business" => Ok(Self::Business),
            "plot" => Ok(Self::Plot),
            "building" => Ok(Self::Building),
            "number" => Ok(Self::Number),
            "price" | "currency" => Ok(Self::Currency),
            other => Err(other.to_string()),
        }
    }
}
