//! Name matching tests.

use haggle_foundation::{Currency, EntityKind, Money};
use haggle_resolver::{MatchKind, Resolution, ResolverConfig, SlotValue, UnresolvedCause};

use crate::fixture::Market;

// =============================================================================
// Exact Names
// =============================================================================

#[test]
fn plural_names_match_exactly() {
    let m = Market::new();
    let r = m.resolve("sell 2 health potions", &m.outside());

    assert_eq!(r.entity_id("item"), Some(m.health));
    assert!((r.slots["item"].confidence - 1.0).abs() < f64::EPSILON);
    assert_eq!(r.slots["quantity"].value(), Some(&SlotValue::Quantity(2)));
}

#[test]
fn aliases_match_exactly() {
    let m = Market::new();
    let r = m.resolve("greet marta", &m.outside());

    assert_eq!(r.entity_id("npc"), Some(m.marta));
    assert!((r.slots["npc"].confidence - 1.0).abs() < f64::EPSILON);
}

#[test]
fn items_outside_every_scope_are_still_found() {
    let m = Market::new();
    let r = m.resolve("sell three iron ore", &m.outside());

    assert_eq!(r.entity_id("item"), Some(m.ore));
    assert_eq!(r.slots["quantity"].value(), Some(&SlotValue::Quantity(3)));
}

// =============================================================================
// Fuzzy Names
// =============================================================================

#[test]
fn typo_resolves_with_reduced_confidence() {
    let m = Market::new();
    let r = m.resolve("sell helth potion", &m.outside());
    let slot = &r.slots["item"];

    assert_eq!(r.entity_id("item"), Some(m.health));
    assert!(slot.confidence > 0.6 && slot.confidence < 1.0, "{}", slot.confidence);
}

#[test]
fn strict_matching_refuses_typos() {
    let m = Market::new();
    let r = m.resolve_with("sell helth potion", &m.outside(), ResolverConfig::strict());

    assert_eq!(r.slots["item"].state, Resolution::Unresolved(UnresolvedCause::NoMatch));
}

#[test]
fn shared_word_is_ambiguous() {
    let m = Market::new();
    let r = m.resolve("sell potion", &m.outside());
    let slot = &r.slots["item"];

    assert!(slot.is_ambiguous());
    let ids: Vec<_> = slot.options().iter().map(|o| o.entity.id).collect();
    assert_eq!(ids, vec![m.health, m.mana]);
    assert!(slot.options().iter().all(|o| o.matched_by == MatchKind::Containment));
}

#[test]
fn part_of_a_word_still_names_the_item() {
    let mut m = Market::new();
    let plank = m.world.add(EntityKind::Item, "Ironwood Plank");
    m.world.give(m.player, plank);
    let r = m.resolve("sell iron", &m.outside());
    let slot = &r.slots["item"];

    assert_eq!(r.entity_id("item"), Some(plank));
    assert!(slot.confidence > 0.6 && slot.confidence < 0.85, "{}", slot.confidence);
}

#[test]
fn unknown_names_do_not_resolve() {
    let m = Market::new();
    let r = m.resolve("sell dragon egg", &m.outside());

    assert_eq!(r.slots["item"].state, Resolution::Unresolved(UnresolvedCause::NoMatch));
    assert_eq!(r.slots["item"].raw, "dragon egg");
}

// =============================================================================
// Amounts
// =============================================================================

#[test]
fn prices_keep_their_currency() {
    let m = Market::new();
    let r = m.resolve("sell 3 iron ore to the pixie for 4sp", &m.outside());

    assert_eq!(r.entity_id("shop"), Some(m.pixie));
    assert_eq!(
        r.slots["price"].value(),
        Some(&SlotValue::Money(Money::new(4, Currency::Silver)))
    );
}

#[test]
fn zero_quantity_is_invalid() {
    let m = Market::new();
    let r = m.resolve("sell 0 mana potions", &m.outside());

    assert_eq!(
        r.slots["quantity"].state,
        Resolution::Unresolved(UnresolvedCause::InvalidValue)
    );
    assert_eq!(r.entity_id("item"), Some(m.mana));
}
