//! Shared world and resolution helpers.

use std::sync::Arc;

use haggle_foundation::{EntityId, EntityKind, InteractionTarget, ParseContext, SessionId};
use haggle_grammar::{Grammar, Matcher};
use haggle_resolver::{EntityLookup, EntityResolver, InMemoryWorld, ResolvedCandidate, ResolverConfig, VocabularyRegistry};
use haggle_stdlib::standard_grammar;

/// A market with one potion shop, a player and a few recipes.
pub struct Market {
    pub world: InMemoryWorld,
    pub grammar: Grammar,
    pub market: EntityId,
    pub player: EntityId,
    pub pixie: EntityId,
    pub health: EntityId,
    pub mana: EntityId,
    pub luck: EntityId,
    pub shield: EntityId,
    pub ore: EntityId,
    pub sword_recipe: EntityId,
    pub shield_recipe: EntityId,
    pub marta: EntityId,
}

impl Market {
    pub fn new() -> Self {
        let mut world = InMemoryWorld::new();
        let market = world.allocate();
        let player = world.allocate();

        let pixie = world.add_with_aliases(EntityKind::Shop, "The Tipsy Pixie", &["pixie"]);
        world.place(pixie, market);

        let health = world.add(EntityKind::Item, "Health Potion");
        let mana = world.add(EntityKind::Item, "Mana Potion");
        let luck = world.add(EntityKind::Item, "Elixir of Luck");
        world.add(EntityKind::Item, "Steel Sword");
        let shield = world.add(EntityKind::Item, "Wooden Shield");
        let ore = world.add(EntityKind::Item, "Iron Ore");
        world.stock(pixie, health);
        world.stock(pixie, luck);
        world.give(player, health);
        world.give(player, mana);
        world.give(player, shield);

        let sword_recipe = world.add(EntityKind::Recipe, "Steel Sword");
        let shield_recipe = world.add(EntityKind::Recipe, "Steel Shield");

        let marta = world.add_with_aliases(EntityKind::Npc, "Old Marta", &["marta"]);
        world.place(marta, market);

        Self {
            world,
            grammar: standard_grammar().unwrap(),
            market,
            player,
            pixie,
            health,
            mana,
            luck,
            shield,
            ore,
            sword_recipe,
            shield_recipe,
            marta,
        }
    }

    /// The player on the market square, knowing the steel sword recipe.
    pub fn outside(&self) -> ParseContext {
        ParseContext::new(SessionId::new("s1"), self.player)
            .at(self.market)
            .knowing(self.sword_recipe)
    }

    /// The player at the Tipsy Pixie's counter.
    pub fn at_pixie(&self) -> ParseContext {
        self.outside().interacting_with(InteractionTarget::Shop(self.pixie))
    }

    pub fn resolve(&self, input: &str, context: &ParseContext) -> ResolvedCandidate {
        self.resolve_with(input, context, ResolverConfig::default())
    }

    pub fn resolve_with(&self, input: &str, context: &ParseContext, config: ResolverConfig) -> ResolvedCandidate {
        let mut candidates = Matcher::new(&self.grammar).match_input(input);
        assert_eq!(candidates.len(), 1, "{input:?} should match one rule");
        let registry = VocabularyRegistry::new(Arc::new(self.grammar.verbs.clone()));
        let lookup: &dyn EntityLookup = &self.world;
        let mut index = registry.index(context, lookup);
        EntityResolver::new(config).resolve(candidates.remove(0), context, &mut index)
    }
}
