//! Context priority tests.
//!
//! Entities in the player's context (the shop's stock when buying, the
//! inventory when selling, known recipes) win over equally good matches
//! elsewhere in the world.

use haggle_foundation::{EntityKind, ParseContext, SessionId};
use haggle_resolver::SlotOrigin;

use crate::fixture::Market;

#[test]
fn shop_stock_wins_when_buying() {
    let m = Market::new();
    let r = m.resolve("buy potion", &m.at_pixie());

    assert_eq!(r.entity_id("item"), Some(m.health));
    assert_eq!(r.entity_id("shop"), Some(m.pixie));
    assert_eq!(r.slots["shop"].origin, SlotOrigin::Defaulted);
}

#[test]
fn named_shop_scopes_the_item() {
    let m = Market::new();
    let r = m.resolve("buy potion from the pixie", &m.outside());

    assert_eq!(r.entity_id("shop"), Some(m.pixie));
    assert_eq!(r.entity_id("item"), Some(m.health));
}

#[test]
fn without_a_shop_every_potion_is_an_option() {
    let m = Market::new();
    let r = m.resolve("buy potion", &m.outside());

    assert!(r.slots["item"].is_ambiguous());
    assert!(r.slots["item"].options().iter().all(|o| !o.in_context));
    assert!(!r.slots.contains_key("shop"));
}

#[test]
fn exact_world_match_beats_loose_context_match() {
    let m = Market::new();
    let r = m.resolve("buy mana potion", &m.at_pixie());

    assert_eq!(r.entity_id("item"), Some(m.mana));
}

#[test]
fn inventory_wins_when_selling() {
    let mut m = Market::new();
    m.world.add(EntityKind::Item, "Iron Shield");
    let r = m.resolve("sell shield", &m.outside());

    assert_eq!(r.entity_id("item"), Some(m.shield));
}

#[test]
fn known_recipe_wins_over_unknown() {
    let m = Market::new();
    let r = m.resolve("craft steel", &m.outside());

    assert_eq!(r.entity_id("recipe"), Some(m.sword_recipe));
    assert!(r.slots["recipe"].confidence < 1.0);
}

#[test]
fn unknown_recipes_tie_without_context() {
    let m = Market::new();
    let stranger = ParseContext::new(SessionId::new("s2"), m.player);
    let r = m.resolve("craft steel", &stranger);
    let ids: Vec<_> = r.slots["recipe"].options().iter().map(|o| o.entity.id).collect();

    assert_eq!(ids, vec![m.shield_recipe, m.sword_recipe]);
}

#[test]
fn price_question_defaults_to_current_shop() {
    let m = Market::new();
    let r = m.resolve("how much is the elixir of luck", &m.at_pixie());

    assert_eq!(r.entity_id("item"), Some(m.luck));
    assert_eq!(r.entity_id("shop"), Some(m.pixie));
}
