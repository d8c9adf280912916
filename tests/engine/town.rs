//! A small town for engine tests.

use std::sync::Arc;

use haggle_debug::{CoverageConfig, CoverageLog};
use haggle_engine::{ClarificationRequest, Engine, EngineConfig, ParseOutcome};
use haggle_foundation::{EntityId, EntityKind, InteractionTarget, Money, ParseContext, SessionId};
use haggle_resolver::InMemoryWorld;
use haggle_stdlib::standard_engine;

pub struct Town {
    pub world: InMemoryWorld,
    pub engine: Engine,
    pub log: Arc<CoverageLog>,
    pub market: EntityId,
    pub player: EntityId,
    pub pixie: EntityId,
    pub health: EntityId,
    pub mana: EntityId,
    pub ore: EntityId,
    pub sword_recipe: EntityId,
    pub marta: EntityId,
    pub bakery: EntityId,
    pub north_field: EntityId,
    pub workshop: EntityId,
    pub bread: EntityId,
}

impl Town {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let mut world = InMemoryWorld::new();
        let market = world.allocate();
        let player = world.allocate();

        let pixie = world.add_with_aliases(EntityKind::Shop, "The Tipsy Pixie", &["pixie"]);
        world.place(pixie, market);

        let health = world.add(EntityKind::Item, "Health Potion");
        let mana = world.add(EntityKind::Item, "Mana Potion");
        let ore = world.add(EntityKind::Item, "Iron Ore");
        let bread = world.add(EntityKind::Item, "Fresh Bread");
        world.stock(pixie, health);
        for item in [health, mana, bread] {
            world.give(player, item);
        }

        let sword_recipe = world.add(EntityKind::Recipe, "Steel Sword");
        let marta = world.add_with_aliases(EntityKind::Npc, "Old Marta", &["marta"]);
        world.place(marta, market);
        let bakery = world.add(EntityKind::Business, "Riverside Bakery");
        let north_field = world.add(EntityKind::Plot, "North Field");
        world.place(north_field, market);
        let workshop = world.add(EntityKind::Building, "Workshop");

        let log = Arc::new(CoverageLog::new(CoverageConfig::default()));
        let engine = standard_engine(config).unwrap().with_sink(log.clone());

        Self {
            world,
            engine,
            log,
            market,
            player,
            pixie,
            health,
            mana,
            ore,
            sword_recipe,
            marta,
            bakery,
            north_field,
            workshop,
            bread,
        }
    }

    /// The player on the market square.
    pub fn outside(&self, session: &str) -> ParseContext {
        ParseContext::new(SessionId::new(session), self.player)
            .at(self.market)
            .knowing(self.sword_recipe)
            .owning(self.bakery)
            .with_balance(Money::gold(100))
    }

    /// The player at the Tipsy Pixie's counter.
    pub fn at_pixie(&self, session: &str) -> ParseContext {
        self.outside(session).interacting_with(InteractionTarget::Shop(self.pixie))
    }

    pub fn parse(&self, input: &str, context: &ParseContext) -> ParseOutcome {
        self.engine.parse(input, context, &self.world)
    }

    pub fn ask(&self, input: &str, context: &ParseContext) -> ClarificationRequest {
        match self.parse(input, context) {
            ParseOutcome::NeedsClarification(request) => request,
            other => panic!("expected a question for {input:?}, got {other:?}"),
        }
    }

    pub fn answer_as(&self, session: &str, request: &ClarificationRequest, follow_up: &str) -> ParseOutcome {
        self.engine
            .resume_clarification(&SessionId::new(session), &request.token, follow_up, &self.world)
    }

    pub fn answer(&self, request: &ClarificationRequest, follow_up: &str) -> ParseOutcome {
        self.engine.resume_clarification(&request.session, &request.token, follow_up, &self.world)
    }
}
