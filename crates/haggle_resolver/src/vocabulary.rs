//! Vocabulary registry.
//!
//! Static vocabulary is the verb table compiled from the grammar. Dynamic
//! vocabulary (the names of shops, items, recipes, ...) comes from the
//! world-state collaborator and is indexed per call and per context:
//!
//! - A [`NounIndex`] is created for one parse call and dropped with it
//! - It issues at most one lookup per `(kind, scope)` pair, lazily
//! - A failed lookup marks that pair unavailable; other pairs still work

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use haggle_foundation::{EntityId, EntityKind, IdSet, Intent, ParseContext, ScopeKey};
use haggle_grammar::VerbTable;

use crate::fuzzy::SurfaceKey;
use crate::lookup::{EntityLookup, EntityRecord, LookupError, LookupScope};

/// One surface form of an indexed entity.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedNoun {
    /// The entity.
    pub id: EntityId,
    /// Its kind.
    pub kind: EntityKind,
    /// Its display name.
    pub display_name: String,
    /// The surface form (display name or alias).
    pub surface: String,
    /// Normalized surface form.
    pub key: SurfaceKey,
    /// True if the entity is in the player's current context.
    pub in_context: bool,
}

/// Entities of one kind visible to a parse.
#[derive(Clone, Debug, Default)]
pub struct NounCandidates {
    /// Surface forms, several per entity when it has aliases.
    pub nouns: Vec<IndexedNoun>,
    /// True if every lookup for the kind failed.
    pub unavailable: bool,
}

/// Holds static verbs and hands out per-call noun indices.
#[derive(Clone, Debug)]
pub struct VocabularyRegistry {
    verbs: Arc<VerbTable>,
}

impl VocabularyRegistry {
    /// Creates a registry over a verb table.
    #[must_use]
    pub fn new(verbs: Arc<VerbTable>) -> Self {
        Self { verbs }
    }

    /// The static verb table.
    #[must_use]
    pub fn verbs(&self) -> &VerbTable {
        &self.verbs
    }

    /// Surface verbs for an intent.
    #[must_use]
    pub fn verbs_for(&self, intent: Intent) -> BTreeSet<String> {
        self.verbs.verbs_for(intent)
    }

    /// Intents a surface verb can express.
    #[must_use]
    pub fn intents_for(&self, surface: &str) -> BTreeSet<Intent> {
        self.verbs.intents_for(surface)
    }

    /// Creates an empty noun index for one parse call.
    #[must_use]
    pub fn index<'a>(&self, context: &'a ParseContext, lookup: &'a dyn EntityLookup) -> NounIndex<'a> {
        NounIndex {
            context,
            lookup,
            scope_key: context.scope_key(),
            cache: BTreeMap::new(),
        }
    }

    /// Context scopes to search for a slot of `kind`.
    ///
    /// Items follow the intent: shop stock when buying or asking prices,
    /// the player's inventory when selling, both otherwise. `shop` is the
    /// shop already resolved for this command, if any.
    #[must_use]
    pub fn context_scopes(
        context: &ParseContext,
        kind: EntityKind,
        intent: Intent,
        shop: Option<EntityId>,
    ) -> Vec<LookupScope> {
        match kind {
            EntityKind::Shop | EntityKind::Npc | EntityKind::Plot => {
                context.location.map(LookupScope::AtLocation).into_iter().collect()
            }
            EntityKind::Item => {
                let shop = shop.or_else(|| context.active_shop()).map(LookupScope::ShopStock);
                let inventory = LookupScope::Inventory(context.player);
                match intent {
                    Intent::BuyItem | Intent::GetItemPrice | Intent::GetMarketPriceInfo | Intent::BrowseShop => {
                        shop.into_iter().collect()
                    }
                    Intent::SellItem | Intent::SetProductPrice | Intent::CheckInventory => vec![inventory],
                    _ => shop.into_iter().chain(std::iter::once(inventory)).collect(),
                }
            }
            EntityKind::Recipe
            | EntityKind::Business
            | EntityKind::Building
            | EntityKind::Number
            | EntityKind::Currency => Vec::new(),
        }
    }
}

/// Context-scoped nouns for one parse call.
///
/// Lookups are issued lazily and memoized, so every candidate and slot of
/// the call shares them.
pub struct NounIndex<'a> {
    context: &'a ParseContext,
    lookup: &'a dyn EntityLookup,
    scope_key: ScopeKey,
    cache: BTreeMap<(EntityKind, LookupScope), Result<Vec<EntityRecord>, LookupError>>,
}

impl NounIndex<'_> {
    /// The scope this index belongs to.
    #[must_use]
    pub fn scope_key(&self) -> &ScopeKey {
        &self.scope_key
    }

    /// Number of distinct lookups issued so far.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.cache.len()
    }

    /// Entities of `kind` in the world, flagged if they are in context.
    ///
    /// `scopes` are the context scopes to query (see
    /// [`VocabularyRegistry::context_scopes`]). Recipes and businesses are
    /// flagged from the context's known recipes and owned businesses.
    pub fn candidate_entities(&mut self, kind: EntityKind, scopes: &[LookupScope]) -> NounCandidates {
        let mut in_context: BTreeSet<EntityId> = match kind {
            EntityKind::Recipe => ids(&self.context.known_recipes),
            EntityKind::Business => ids(&self.context.owned_businesses),
            _ => BTreeSet::new(),
        };

        let mut records: BTreeMap<EntityId, EntityRecord> = BTreeMap::new();
        let mut answered = 0;

        for scope in scopes {
            if let Ok(found) = self.fetch(kind, scope) {
                answered += 1;
                for record in found {
                    in_context.insert(record.id);
                    records.entry(record.id).or_insert_with(|| record.clone());
                }
            }
        }
        if let Ok(found) = self.fetch(kind, &LookupScope::World) {
            answered += 1;
            for record in found {
                records.entry(record.id).or_insert_with(|| record.clone());
            }
        }

        if answered == 0 {
            return NounCandidates {
                nouns: Vec::new(),
                unavailable: true,
            };
        }

        let mut nouns = Vec::new();
        for record in records.values() {
            let flagged = in_context.contains(&record.id);
            for surface in record.surface_forms() {
                nouns.push(IndexedNoun {
                    id: record.id,
                    kind: record.kind,
                    display_name: record.display_name.clone(),
                    surface: surface.to_string(),
                    key: SurfaceKey::new(surface),
                    in_context: flagged,
                });
            }
        }
        NounCandidates {
            nouns,
            unavailable: false,
        }
    }

    /// The display name of an entity, if any successful lookup returned it.
    #[must_use]
    pub fn display_name(&self, id: EntityId) -> Option<&str> {
        self.cache
            .values()
            .filter_map(|r| r.as_ref().ok())
            .flatten()
            .find(|r| r.id == id)
            .map(|r| r.display_name.as_str())
    }

    /// Looks up an entity's display name, querying the world if needed.
    pub fn name_of(&mut self, kind: EntityKind, id: EntityId) -> Option<String> {
        if let Some(name) = self.display_name(id) {
            return Some(name.to_string());
        }
        let found = self.fetch(kind, &LookupScope::World).ok()?;
        found.iter().find(|r| r.id == id).map(|r| r.display_name.clone())
    }

    fn fetch(&mut self, kind: EntityKind, scope: &LookupScope) -> Result<&[EntityRecord], LookupError> {
        let key = (kind, scope.clone());
        if !self.cache.contains_key(&key) {
            let result = self.lookup.lookup_entities(kind, scope, None);
            match &result {
                Ok(records) => {
                    tracing::trace!(%kind, ?scope, count = records.len(), "indexed entities");
                }
                Err(err) => {
                    tracing::warn!(%kind, ?scope, error = %err, "entity lookup failed; degrading");
                }
            }
            self.cache.insert(key.clone(), result);
        }
        match self.cache.get(&key) {
            Some(Ok(records)) => Ok(records.as_slice()),
            Some(Err(err)) => Err(err.clone()),
            None => Err(LookupError::Unavailable(format!("{kind} lookup missing"))),
        }
    }
}

fn ids(set: &IdSet) -> BTreeSet<EntityId> {
    set.iter().collect()
}
