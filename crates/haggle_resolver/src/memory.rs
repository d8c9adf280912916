//! In-memory collaborators for tests and demos.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use haggle_foundation::{EntityId, EntityKind, ParseContext, SessionId};

use crate::lookup::{ContextProvider, EntityLookup, EntityRecord, LookupError, LookupScope};

/// A small world held in memory.
///
/// Implements both [`EntityLookup`] and [`ContextProvider`]. Individual kinds
/// can be made to fail, and every lookup is counted.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    entities: BTreeMap<EntityId, EntityRecord>,
    locations: BTreeMap<EntityId, EntityId>,
    stock: BTreeMap<EntityId, BTreeSet<EntityId>>,
    inventory: BTreeMap<EntityId, BTreeSet<EntityId>>,
    contexts: BTreeMap<SessionId, ParseContext>,
    failing: BTreeSet<EntityKind>,
    next_id: u64,
    queries: AtomicUsize,
}

impl InMemoryWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Allocates an id without creating an entity (players, locations).
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id.max(1));
        self.next_id = id.raw() + 1;
        id
    }

    /// Adds an entity and returns its id.
    pub fn add(&mut self, kind: EntityKind, name: &str) -> EntityId {
        let id = self.allocate();
        self.entities.insert(id, EntityRecord::new(id, kind, name));
        id
    }

    /// Adds an entity with aliases and returns its id.
    pub fn add_with_aliases(&mut self, kind: EntityKind, name: &str, aliases: &[&str]) -> EntityId {
        let id = self.add(kind, name);
        if let Some(record) = self.entities.get_mut(&id) {
            record.aliases = aliases.iter().map(|a| (*a).to_string()).collect();
        }
        id
    }

    /// Inserts a prepared record, replacing any entity with the same id.
    pub fn insert(&mut self, record: EntityRecord) {
        self.next_id = self.next_id.max(record.id.raw() + 1);
        self.entities.insert(record.id, record);
    }

    /// Places an entity at a location.
    pub fn place(&mut self, entity: EntityId, location: EntityId) {
        self.locations.insert(entity, location);
    }

    /// Adds an item to a shop's stock.
    pub fn stock(&mut self, shop: EntityId, item: EntityId) {
        self.stock.entry(shop).or_default().insert(item);
    }

    /// Adds an item to a player's inventory.
    pub fn give(&mut self, player: EntityId, item: EntityId) {
        self.inventory.entry(player).or_default().insert(item);
    }

    /// Stores the context returned for its session.
    pub fn set_context(&mut self, context: ParseContext) {
        self.contexts.insert(context.session.clone(), context);
    }

    /// Makes lookups of a kind fail.
    pub fn fail_kind(&mut self, kind: EntityKind) {
        self.failing.insert(kind);
    }

    /// Makes lookups of a kind succeed again.
    pub fn restore_kind(&mut self, kind: EntityKind) {
        self.failing.remove(&kind);
    }

    /// Looks up an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&id)
    }

    /// Finds the first entity with the given display name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.entities
            .values()
            .find(|r| r.display_name.eq_ignore_ascii_case(name))
            .map(|r| r.id)
    }

    /// Number of lookups answered or refused so far.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    /// Resets the lookup counter.
    pub fn reset_query_count(&self) {
        self.queries.store(0, Ordering::Relaxed);
    }

    fn in_scope(&self, record: &EntityRecord, scope: &LookupScope) -> bool {
        match scope {
            LookupScope::World => true,
            LookupScope::AtLocation(location) => self.locations.get(&record.id) == Some(location),
            LookupScope::ShopStock(shop) => self.stock.get(shop).is_some_and(|s| s.contains(&record.id)),
            LookupScope::Inventory(player) => self
                .inventory
                .get(player)
                .is_some_and(|s| s.contains(&record.id)),
        }
    }
}

impl EntityLookup for InMemoryWorld {
    fn lookup_entities(
        &self,
        kind: EntityKind,
        scope: &LookupScope,
        _surface_hint: Option<&str>,
    ) -> Result<Vec<EntityRecord>, LookupError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if self.failing.contains(&kind) {
            return Err(LookupError::Unavailable(format!("{kind} service is down")));
        }
        Ok(self
            .entities
            .values()
            .filter(|r| r.kind == kind && self.in_scope(r, scope))
            .cloned()
            .collect())
    }
}

impl ContextProvider for InMemoryWorld {
    fn context_snapshot(&self, session: &SessionId) -> Result<ParseContext, LookupError> {
        self.contexts
            .get(session)
            .cloned()
            .ok_or_else(|| LookupError::UnknownSession(session.clone()))
    }
}
