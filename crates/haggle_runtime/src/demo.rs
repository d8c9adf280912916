//! A small market town to type commands against.
//!
//! The REPL and the integration tests run on the same world: two shops and
//! two townsfolk on one market square, a player who owns a bakery and
//! carries a few things.

use haggle_foundation::{EntityId, EntityKind, InteractionTarget, Money, ParseContext, SessionId};
use haggle_resolver::{EntityLookup, InMemoryWorld, LookupScope};

/// Starting balance of the demo player.
pub const STARTING_GOLD: u64 = 150;

/// The demo world and the ids the runtime needs to refer to.
#[derive(Debug)]
pub struct DemoWorld {
    world: InMemoryWorld,
    /// The player entity.
    pub player: EntityId,
    /// The market square everyone stands in.
    pub market: EntityId,
    /// The potion shop.
    pub pixie: EntityId,
    /// The smithy.
    pub smithy: EntityId,
    /// Recipes the player knows.
    pub known_recipes: Vec<EntityId>,
    /// Businesses the player owns.
    pub owned_businesses: Vec<EntityId>,
}

impl DemoWorld {
    /// Builds the demo world.
    #[must_use]
    pub fn new() -> Self {
        let mut world = InMemoryWorld::new();
        let market = world.allocate();
        let player = world.allocate();

        let pixie = world.add_with_aliases(EntityKind::Shop, "The Tipsy Pixie", &["pixie"]);
        let smithy = world.add_with_aliases(EntityKind::Shop, "Grumbold's Smithy", &["smithy"]);
        world.place(pixie, market);
        world.place(smithy, market);

        let health = world.add(EntityKind::Item, "Health Potion");
        let mana = world.add(EntityKind::Item, "Mana Potion");
        let luck = world.add(EntityKind::Item, "Elixir of Luck");
        let sword = world.add(EntityKind::Item, "Steel Sword");
        let ingot = world.add(EntityKind::Item, "Steel Ingot");
        let ore = world.add(EntityKind::Item, "Iron Ore");
        let shield = world.add(EntityKind::Item, "Wooden Shield");
        let bread = world.add(EntityKind::Item, "Fresh Bread");
        for item in [health, mana, luck] {
            world.stock(pixie, item);
        }
        for item in [sword, ingot, ore] {
            world.stock(smithy, item);
        }
        for item in [health, mana, ore, shield, bread] {
            world.give(player, item);
        }

        let sword_recipe = world.add(EntityKind::Recipe, "Steel Sword");
        let draught = world.add(EntityKind::Recipe, "Healing Draught");
        world.add(EntityKind::Recipe, "Steel Shield");

        let marta = world.add_with_aliases(EntityKind::Npc, "Old Marta", &["marta"]);
        let brom = world.add_with_aliases(EntityKind::Npc, "Brom the Smith", &["brom"]);
        world.place(marta, market);
        world.place(brom, market);

        let bakery = world.add_with_aliases(EntityKind::Business, "Riverside Bakery", &["bakery"]);
        world.add(EntityKind::Business, "Golden Anvil");

        let north = world.add(EntityKind::Plot, "North Field");
        let lot = world.add(EntityKind::Plot, "Riverside Lot");
        world.place(north, market);
        world.place(lot, market);

        for building in ["Warehouse", "Workshop", "Market Stall"] {
            world.add(EntityKind::Building, building);
        }

        world.reset_query_count();
        Self {
            world,
            player,
            market,
            pixie,
            smithy,
            known_recipes: vec![sword_recipe, draught],
            owned_businesses: vec![bakery],
        }
    }

    /// The underlying world.
    #[must_use]
    pub fn world(&self) -> &InMemoryWorld {
        &self.world
    }

    /// Mutable access, for stocking shops or failing lookups.
    pub fn world_mut(&mut self) -> &mut InMemoryWorld {
        &mut self.world
    }

    /// The player standing on the market square, at the counter of the
    /// Tipsy Pixie.
    #[must_use]
    pub fn context(&self, session: SessionId) -> ParseContext {
        let mut context = ParseContext::new(session, self.player)
            .at(self.market)
            .interacting_with(InteractionTarget::Shop(self.pixie))
            .with_balance(Money::gold(STARTING_GOLD));
        for recipe in &self.known_recipes {
            context = context.knowing(*recipe);
        }
        for business in &self.owned_businesses {
            context = context.owning(*business);
        }
        context
    }

    /// Finds an entity of `kind` by display name or alias, ignoring case.
    #[must_use]
    pub fn named(&self, kind: EntityKind, name: &str) -> Option<EntityId> {
        let name = name.trim();
        let found = self.world.lookup_entities(kind, &LookupScope::World, Some(name)).ok()?;
        found
            .into_iter()
            .find(|r| r.surface_forms().any(|s| s.eq_ignore_ascii_case(name)))
            .map(|r| r.id)
    }

    /// The display name of an entity.
    #[must_use]
    pub fn name_of(&self, id: EntityId) -> Option<&str> {
        self.world.get(id).map(|r| r.display_name.as_str())
    }
}

impl Default for DemoWorld {
    fn default() -> Self {
        Self::new()
    }
}
