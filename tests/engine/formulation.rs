//! Service calls built from accepted commands.

use std::collections::BTreeMap;

use haggle_engine::{
    ActionFormulator, CommandSource, FormulationError, ResolvedCommand, Service, ServiceCall,
};
use haggle_foundation::{EntityKind, Intent, Money, ParseContext, SessionId};
use haggle_resolver::{EntityRef, SlotValue};

use crate::town::Town;

fn call(town: &Town, input: &str, context: &ParseContext) -> ServiceCall {
    let outcome = town.parse(input, context);
    let command = outcome
        .command()
        .unwrap_or_else(|| panic!("{input:?} was not accepted: {outcome:?}"));
    ActionFormulator::new().formulate(command, context).unwrap()
}

// =============================================================================
// Trade
// =============================================================================

#[test]
fn purchase_defaults_quantity_and_shop() {
    let town = Town::new();
    let ctx = town.at_pixie("s1");

    match call(&town, "buy a health potion", &ctx) {
        ServiceCall::Purchase(request) => {
            assert_eq!(request.buyer, town.player);
            assert_eq!(request.item, town.health);
            assert_eq!(request.quantity, 1);
            assert_eq!(request.shop, Some(town.pixie));
            assert_eq!(request.offered_unit_price, None);
        }
        other => panic!("expected a purchase, got {other:?}"),
    }
}

#[test]
fn sale_carries_the_asking_price() {
    let town = Town::new();
    let sale = call(&town, "sell 2 mana potions to the pixie for 4 gold", &town.outside("s1"));

    assert_eq!(sale.service(), Service::Trade);
    match sale {
        ServiceCall::Sale(request) => {
            assert_eq!(request.item, town.mana);
            assert_eq!(request.quantity, 2);
            assert_eq!(request.shop, Some(town.pixie));
            assert_eq!(request.asking_unit_price, Some(Money::gold(4)));
        }
        other => panic!("expected a sale, got {other:?}"),
    }
}

// =============================================================================
// Production and Business
// =============================================================================

#[test]
fn production_calls() {
    let town = Town::new();
    let ctx = town.outside("s1");

    match call(&town, "craft steel sword", &ctx) {
        ServiceCall::Craft(request) => {
            assert_eq!(request.recipe, town.sword_recipe);
            assert_eq!(request.quantity, 1);
        }
        other => panic!("expected crafting, got {other:?}"),
    }

    match call(&town, "build a workshop on the north field", &ctx) {
        ServiceCall::Construct(request) => {
            assert_eq!(request.building, town.workshop);
            assert_eq!(request.plot, Some(town.north_field));
        }
        other => panic!("expected construction, got {other:?}"),
    }
}

#[test]
fn business_calls() {
    let town = Town::new();
    let ctx = town.outside("s1");

    let change = call(&town, "set the price of fresh bread to 5 gold", &ctx);
    assert_eq!(change.service(), Service::Business);
    match change {
        ServiceCall::SetPrice(request) => {
            assert_eq!(request.owner, town.player);
            assert_eq!(request.item, town.bread);
            assert_eq!(request.price, Money::gold(5));
            assert_eq!(request.business, None);
        }
        other => panic!("expected a price change, got {other:?}"),
    }

    match call(&town, "hire marta for the riverside bakery", &ctx) {
        ServiceCall::Hire(request) => {
            assert_eq!(request.worker, town.marta);
            assert_eq!(request.business, Some(town.bakery));
        }
        other => panic!("expected hiring, got {other:?}"),
    }
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn personal_queries_address_the_player() {
    let town = Town::new();
    let ctx = town.outside("s1");

    let inventory = call(&town, "inventory", &ctx);
    assert_eq!(inventory.service(), Service::Inventory);
    assert!(matches!(inventory, ServiceCall::Inventory(q) if q.player == town.player));
    assert!(matches!(call(&town, "balance", &ctx), ServiceCall::Balance(_)));
    let recipes = call(&town, "recipes", &ctx);
    assert_eq!(recipes.service(), Service::Crafting);
}

#[test]
fn price_queries() {
    let town = Town::new();

    match call(&town, "how much is a health potion", &town.at_pixie("s1")) {
        ServiceCall::Price(query) => {
            assert_eq!(query.item, town.health);
            assert_eq!(query.shop, Some(town.pixie));
        }
        other => panic!("expected a price query, got {other:?}"),
    }

    let report = call(&town, "market prices for iron ore", &town.outside("s1"));
    assert_eq!(report.service(), Service::Market);
    match report {
        ServiceCall::Market(query) => {
            assert_eq!(query.item, Some(town.ore));
            assert_eq!(query.location, Some(town.market));
        }
        other => panic!("expected a market report, got {other:?}"),
    }
}

#[test]
fn browsing_and_talking() {
    let town = Town::new();

    match call(&town, "browse", &town.at_pixie("s1")) {
        ServiceCall::Browse(listing) => assert_eq!(listing.shop, town.pixie),
        other => panic!("expected a listing, got {other:?}"),
    }

    let talk = call(&town, "talk to marta", &town.outside("s1"));
    assert_eq!(talk.service(), Service::Dialogue);
    assert!(matches!(talk, ServiceCall::Talk(c) if c.npc == town.marta));
}

// =============================================================================
// Errors
// =============================================================================

fn bare(intent: Intent) -> ResolvedCommand {
    ResolvedCommand {
        intent,
        rule_id: "hand-built".to_string(),
        session: SessionId::new("s1"),
        slots: BTreeMap::new(),
        overall_confidence: 1.0,
        source: CommandSource::Code,
        clarified: false,
    }
}

#[test]
fn required_slots_must_be_present() {
    let town = Town::new();
    let ctx = town.outside("s1");
    let formulator = ActionFormulator::new();

    assert_eq!(
        formulator.formulate(&bare(Intent::BuyItem), &ctx),
        Err(FormulationError::MissingSlot {
            intent: Intent::BuyItem,
            slot: "item".to_string(),
            kind: EntityKind::Item,
        })
    );
    assert!(matches!(
        formulator.formulate(&bare(Intent::BrowseShop), &ctx),
        Err(FormulationError::MissingSlot { kind: EntityKind::Shop, .. })
    ));
    assert!(matches!(
        formulator.formulate(&bare(Intent::BrowseShop), &town.at_pixie("s1")),
        Ok(ServiceCall::Browse(_))
    ));
}

#[test]
fn fallback_commands_are_formulated_too() {
    let town = Town::new();
    let ctx = town.outside("s1");
    let marta = EntityRef {
        id: town.marta,
        kind: EntityKind::Npc,
        display_name: "Old Marta".to_string(),
    };

    let talk = ResolvedCommand::from_fallback(
        Intent::TalkToNpc,
        SessionId::new("s1"),
        [("npc".to_string(), SlotValue::Entity(marta.clone()))],
        0.7,
    );
    assert_eq!(talk.source, CommandSource::Fallback);
    assert!(matches!(
        ActionFormulator::new().formulate(&talk, &ctx),
        Ok(ServiceCall::Talk(c)) if c.npc == town.marta
    ));

    let confused = ResolvedCommand::from_fallback(
        Intent::BuyItem,
        SessionId::new("s1"),
        [("item".to_string(), SlotValue::Entity(marta))],
        0.7,
    );
    let err = ActionFormulator::new().formulate(&confused, &ctx).unwrap_err();
    assert_eq!(
        err,
        FormulationError::WrongKind {
            intent: Intent::BuyItem,
            slot: "item".to_string(),
            expected: EntityKind::Item,
        }
    );
    assert_eq!(err.to_string(), "slot `item` of buy-item should hold a item");
}
