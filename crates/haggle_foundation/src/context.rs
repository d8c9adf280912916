//! The caller-supplied parse context.
//!
//! A [`ParseContext`] describes the player's situation at the moment a command
//! is typed. It is constructed (or refreshed) by the caller for every input and
//! is read-only to the engine.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collections::IdSet;
use crate::entity::EntityId;
use crate::money::Money;

/// Identifies one player session.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the player is currently interacting with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InteractionTarget {
    /// Browsing or trading with a shop.
    Shop(EntityId),
    /// Talking to an NPC.
    Npc(EntityId),
}

/// The player's situation, used to scope vocabulary and as resolution hints.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParseContext {
    /// Session issuing the command.
    pub session: SessionId,
    /// The player entity.
    pub player: EntityId,
    /// Where the player currently is.
    pub location: Option<EntityId>,
    /// Shop or NPC the player is interacting with.
    pub target: Option<InteractionTarget>,
    /// Recipes the player knows.
    pub known_recipes: IdSet,
    /// Current currency balance.
    pub balance: Money,
    /// Businesses the player owns.
    pub owned_businesses: IdSet,
}

impl ParseContext {
    /// Creates a context for a player with nothing known about their situation.
    #[must_use]
    pub fn new(session: SessionId, player: EntityId) -> Self {
        Self {
            session,
            player,
            location: None,
            target: None,
            known_recipes: IdSet::new(),
            balance: Money::gold(0),
            owned_businesses: IdSet::new(),
        }
    }

    /// Builder method to set the location.
    #[must_use]
    pub fn at(mut self, location: EntityId) -> Self {
        self.location = Some(location);
        self
    }

    /// Builder method to set the interaction target.
    #[must_use]
    pub fn interacting_with(mut self, target: InteractionTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Builder method to add a known recipe.
    #[must_use]
    pub fn knowing(mut self, recipe: EntityId) -> Self {
        self.known_recipes = self.known_recipes.insert(recipe);
        self
    }

    /// Builder method to add an owned business.
    #[must_use]
    pub fn owning(mut self, business: EntityId) -> Self {
        self.owned_businesses = self.owned_businesses.insert(business);
        self
    }

    /// Builder method to set the balance.
    #[must_use]
    pub fn with_balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }

    /// The shop being interacted with, if any.
    #[must_use]
    pub fn active_shop(&self) -> Option<EntityId> {
        match self.target {
            Some(InteractionTarget::Shop(id)) => Some(id),
            _ => None,
        }
    }

    /// The NPC being interacted with, if any.
    #[must_use]
    pub fn active_npc(&self) -> Option<EntityId> {
        match self.target {
            Some(InteractionTarget::Npc(id)) => Some(id),
            _ => None,
        }
    }

    /// The fields that scope dynamic vocabulary.
    #[must_use]
    pub fn scope_key(&self) -> ScopeKey {
        ScopeKey {
            session: self.session.clone(),
            player: self.player,
            location: self.location,
            target: self.target,
        }
    }
}

/// Key identifying a dynamic vocabulary scope.
///
/// Two contexts with equal keys see the same context-scoped nouns.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScopeKey {
    /// Session the scope belongs to.
    pub session: SessionId,
    /// Player the scope belongs to.
    pub player: EntityId,
    /// Location scoping shops, npcs and plots.
    pub location: Option<EntityId>,
    /// Interaction target scoping items.
    pub target: Option<InteractionTarget>,
}
