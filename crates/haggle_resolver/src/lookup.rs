//! Collaborator interfaces.
//!
//! The engine reads world state through two narrow traits. It never caches
//! what they return beyond a single parse call.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use haggle_foundation::{EntityId, EntityKind, ParseContext, SessionId};

/// Where to look for entities.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LookupScope {
    /// Everything of the kind that exists.
    World,
    /// Entities at a location (shops, npcs, plots).
    AtLocation(EntityId),
    /// Items a shop currently stocks.
    ShopStock(EntityId),
    /// Items a player carries.
    Inventory(EntityId),
}

/// An entity as reported by a collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityRecord {
    /// Entity id.
    pub id: EntityId,
    /// Entity kind.
    pub kind: EntityKind,
    /// Name shown to players.
    pub display_name: String,
    /// Other names players may use.
    pub aliases: Vec<String>,
    /// Free-form metadata (price, stock level, owner, ...).
    pub attributes: BTreeMap<String, String>,
}

impl EntityRecord {
    /// Creates a record with no aliases or attributes.
    #[must_use]
    pub fn new(id: EntityId, kind: EntityKind, display_name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            display_name: display_name.into(),
            aliases: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder method to add an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Builder method to add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The display name followed by every alias.
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.display_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// A collaborator failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The service could not answer.
    #[error("lookup service unavailable: {0}")]
    Unavailable(String),
    /// The session is not known to the context provider.
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),
}

/// Batch entity lookups.
///
/// One call should answer a whole `(kind, scope)` pair; the engine makes at
/// most one call per pair per parse.
pub trait EntityLookup {
    /// Returns every entity of `kind` within `scope`.
    ///
    /// `surface_hint` is the raw text being resolved, for collaborators that
    /// can pre-filter. Implementations may ignore it.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot answer.
    fn lookup_entities(
        &self,
        kind: EntityKind,
        scope: &LookupScope,
        surface_hint: Option<&str>,
    ) -> Result<Vec<EntityRecord>, LookupError>;
}

/// Supplies the current parse context for a session.
pub trait ContextProvider {
    /// Returns a fresh snapshot of the session's situation.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or the service is down.
    fn context_snapshot(&self, session: &SessionId) -> Result<ParseContext, LookupError>;
}

impl<T: EntityLookup + ?Sized> EntityLookup for &T {
    fn lookup_entities(
        &self,
        kind: EntityKind,
        scope: &LookupScope,
        surface_hint: Option<&str>,
    ) -> Result<Vec<EntityRecord>, LookupError> {
        (**self).lookup_entities(kind, scope, surface_hint)
    }
}
