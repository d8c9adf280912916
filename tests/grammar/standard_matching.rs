//! Matching tests against the standard economy grammar.

use haggle_foundation::{EntityKind, Intent};
use haggle_grammar::{Grammar, Matcher, ParseCandidate};
use haggle_stdlib::{AMBIGUOUS_ITEM_PRICE, AMBIGUOUS_PRICE_CHECK, CANONICAL, PARAPHRASES, standard_grammar};
use proptest::prelude::*;

fn grammar() -> Grammar {
    standard_grammar().unwrap()
}

fn single(grammar: &Grammar, input: &str) -> ParseCandidate {
    let mut candidates = Matcher::new(grammar).match_input(input);
    assert_eq!(candidates.len(), 1, "{input:?} gave {candidates:?}");
    candidates.remove(0)
}

fn text<'c>(candidate: &'c ParseCandidate, slot: &str) -> Option<&'c str> {
    candidate.slot(slot).map(|s| s.text.as_str())
}

// =============================================================================
// Example Corpus
// =============================================================================

#[test]
fn every_example_matches_its_rule() {
    let grammar = grammar();

    for example in CANONICAL.iter().chain(PARAPHRASES) {
        let candidate = single(&grammar, example.input);
        assert_eq!(candidate.intent, example.intent, "{}", example.input);
        assert_eq!(candidate.rule_id, example.rule, "{}", example.input);
    }
}

#[test]
fn every_intent_has_a_canonical_example() {
    for intent in Intent::ALL {
        assert!(CANONICAL.iter().any(|e| e.intent == intent), "{intent}");
    }
}

// =============================================================================
// Slot Extraction
// =============================================================================

#[test]
fn sale_to_named_shop_extracts_every_slot() {
    let grammar = grammar();
    let c = single(&grammar, "sell 3 iron ore to Grumbold's Smithy for 4 gold");

    assert_eq!(c.rule_id, "sell-item/to-shop");
    assert_eq!(text(&c, "quantity"), Some("3"));
    assert_eq!(text(&c, "item"), Some("iron ore"));
    assert_eq!(text(&c, "shop"), Some("grumbolds smithy"));
    assert_eq!(text(&c, "price"), Some("4 gold"));
    assert!(c.missing_expected.is_empty());
}

#[test]
fn price_change_reads_item_and_amount() {
    let grammar = grammar();
    let c = single(&grammar, "set the price of fresh bread to 5 gold");

    assert_eq!(c.intent, Intent::SetProductPrice);
    assert_eq!(text(&c, "item"), Some("fresh bread"));
    assert_eq!(text(&c, "price"), Some("5 gold"));
    assert_eq!(c.slot("price").map(|s| s.kind), Some(EntityKind::Currency));
}

#[test]
fn construction_on_a_plot() {
    let grammar = grammar();
    let c = single(&grammar, "build a workshop on the north field");

    assert_eq!(text(&c, "building"), Some("workshop"));
    assert_eq!(text(&c, "plot"), Some("north field"));
}

#[test]
fn missing_price_costs_confidence() {
    let grammar = grammar();
    let c = single(&grammar, "buy a health potion from the Tipsy Pixie");

    assert_eq!(c.rule_id, "buy-item/from-shop");
    assert_eq!(c.missing_expected.len(), 1);
    assert_eq!(c.missing_expected[0].name, "price");
    assert!(c.grammar_confidence < c.base_confidence);
}

#[test]
fn bare_purchase_leaves_shop_to_context() {
    let grammar = grammar();
    let c = single(&grammar, "purchase a mana potion");

    assert_eq!(c.rule_id, "buy-item/bare");
    assert!(!c.supplies("shop"));
    assert!(c.defaultable.iter().any(|spec| spec.name == "shop"));
}

#[test]
fn no_slot_queries_match_on_verbs_alone() {
    let grammar = grammar();

    for (input, intent) in [
        ("inventory", Intent::CheckInventory),
        ("what am I carrying", Intent::CheckInventory),
        ("how rich am i", Intent::CheckBalance),
        ("recipes", Intent::ListRecipes),
    ] {
        let c = single(&grammar, input);
        assert_eq!(c.intent, intent, "{input}");
        assert!(c.raw_slots.is_empty(), "{input}");
    }
}

// =============================================================================
// Politeness and Noise
// =============================================================================

#[test]
fn fillers_and_preambles_are_ignored() {
    let grammar = grammar();
    let plain = single(&grammar, "buy a mana potion");
    let polite = single(&grammar, "Could I please buy a mana potion, please?");

    assert_eq!(plain.rule_id, polite.rule_id);
    assert_eq!(text(&plain, "item"), text(&polite, "item"));
}

#[test]
fn small_talk_matches_nothing() {
    let matcher_grammar = grammar();
    let matcher = Matcher::new(&matcher_grammar);

    for input in ["what's the weather like", "hello there", "please please", "sing a song"] {
        assert!(matcher.match_input(input).is_empty(), "{input}");
    }
}

// =============================================================================
// Competing Readings
// =============================================================================

#[test]
fn price_check_is_split_between_market_and_shop() {
    let grammar = grammar();
    let candidates = Matcher::new(&grammar).match_input(AMBIGUOUS_PRICE_CHECK);
    let intents: Vec<Intent> = candidates.iter().map(|c| c.intent).collect();

    assert_eq!(candidates.len(), 2);
    assert!(intents.contains(&Intent::GetMarketPriceInfo));
    assert!(intents.contains(&Intent::BrowseShop));
    assert!(candidates.iter().all(|c| c.grammar_confidence < 0.85));
}

#[test]
fn single_price_check_is_split_between_item_and_market() {
    let grammar = grammar();
    let candidates = Matcher::new(&grammar).match_input(AMBIGUOUS_ITEM_PRICE);
    let intents: Vec<Intent> = candidates.iter().map(|c| c.intent).collect();

    assert_eq!(intents, vec![Intent::GetItemPrice, Intent::GetMarketPriceInfo]);
    assert!(candidates.iter().all(|c| c.grammar_confidence < 0.85));
}

#[test]
fn naming_the_item_keeps_the_price_check_on_one_reading() {
    let grammar = grammar();
    let c = single(&grammar, "check the price for iron ore");

    assert_eq!(c.rule_id, "get-item-price/check-price");
    assert_eq!(text(&c, "item"), Some("iron ore"));
    assert!(c.missing_expected.is_empty());

    let c = single(&grammar, "check the price of iron ore");
    assert_eq!(c.rule_id, "get-item-price/ask");
}

#[test]
fn naming_the_shop_settles_the_price_check() {
    let grammar = grammar();
    let c = single(&grammar, "check prices at the Tipsy Pixie");

    assert_eq!(c.rule_id, "browse-shop/prices-at");
    assert_eq!(text(&c, "shop"), Some("tipsy pixie"));
}

proptest! {
    #[test]
    fn quantity_survives_any_politeness(n in 1u64..500, polite in any::<bool>()) {
        let grammar = grammar();
        let lead = if polite { "please " } else { "" };
        let c = single(&grammar, &format!("{lead}sell {n} iron ore"));
        let expected = n.to_string();
        prop_assert_eq!(text(&c, "quantity"), Some(expected.as_str()));
        prop_assert_eq!(text(&c, "item"), Some("iron ore"));
    }
}
