//! Persistent collections with structural sharing.
//!
//! Thin wrappers around the `im` crate so that a [`ParseContext`] can be
//! cloned into suspended clarification state in O(1).
//!
//! [`ParseContext`]: crate::ParseContext

use std::fmt;
use std::iter::FromIterator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Persistent ordered set of entity ids.
///
/// Cloning is O(1). Modifications return a new set sharing structure
/// with the original.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdSet(im::OrdSet<EntityId>);

impl IdSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self(im::OrdSet::new())
    }

    /// Returns the number of ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the set contains the id.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.0.contains(&id)
    }

    /// Returns a new set with the id added.
    #[must_use]
    pub fn insert(&self, id: EntityId) -> Self {
        let mut new = self.0.clone();
        new.insert(id);
        Self(new)
    }

    /// Returns a new set with the id removed.
    #[must_use]
    pub fn remove(&self, id: EntityId) -> Self {
        let mut new = self.0.clone();
        new.remove(&id);
        Self(new)
    }

    /// Iterates over the ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Debug for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

impl FromIterator<EntityId> for IdSet {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
