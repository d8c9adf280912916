//! Questions and their single follow-up.

use haggle_engine::{Engine, EngineConfig, RejectionReason};
use haggle_foundation::{Intent, Money};
use haggle_grammar::GrammarCompiler;
use haggle_resolver::SlotOrigin;
use haggle_stdlib::AMBIGUOUS_ITEM_PRICE;

use crate::town::Town;

fn reason(outcome: &haggle_engine::ParseOutcome) -> Option<&RejectionReason> {
    outcome.diagnostic().map(|d| &d.reason)
}

// =============================================================================
// Ambiguous Slots
// =============================================================================

#[test]
fn naming_the_option_resolves_it() {
    let town = Town::new();
    let request = town.ask("sell potion", &town.outside("s1"));

    let outcome = town.answer(&request, "the mana one");
    let command = outcome.command().expect("accepted");
    assert_eq!(command.entity_id("item"), Some(town.mana));
    assert_eq!(command.slot("item").map(|s| s.origin), Some(SlotOrigin::Clarified));
    assert!(command.clarified);
    assert_eq!(town.engine.pending_clarifications(), 0);
}

#[test]
fn ordinals_pick_by_position() {
    let cases = [("second", "mana"), ("1", "health"), ("the last one", "mana"), ("first", "health")];

    for (answer, expected) in cases {
        let town = Town::new();
        let request = town.ask("sell potion", &town.outside("s1"));
        let outcome = town.answer(&request, answer);
        let expected = if expected == "mana" { town.mana } else { town.health };
        assert_eq!(outcome.command().and_then(|c| c.entity_id("item")), Some(expected), "{answer}");
    }
}

#[test]
fn an_answer_that_fits_both_options_ends_the_exchange() {
    let town = Town::new();
    let request = town.ask("sell potion", &town.outside("s1"));

    let outcome = town.answer(&request, "potion");
    assert_eq!(reason(&outcome), Some(&RejectionReason::UnansweredClarification));
    assert_eq!(
        outcome.diagnostic().and_then(|d| d.follow_up.as_deref()),
        Some("potion")
    );

    let again = town.answer(&request, "mana");
    assert_eq!(reason(&again), Some(&RejectionReason::UnknownClarification));
}

// =============================================================================
// Competing Intents
// =============================================================================

#[test]
fn price_check_at_a_shop_asks_which_reading() {
    let town = Town::new();
    let request = town.ask("check prices", &town.at_pixie("s1"));

    assert_eq!(request.prompt, "Do you want to view market prices or browse a shop?");
    assert_eq!(request.options, vec!["view market prices", "browse a shop"]);

    let outcome = town.answer(&request, "browse");
    let command = outcome.command().expect("accepted");
    assert_eq!(command.intent, Intent::BrowseShop);
    assert_eq!(command.entity_id("shop"), Some(town.pixie));
}

#[test]
fn reading_can_be_chosen_by_position() {
    let town = Town::new();
    let request = town.ask("check prices", &town.at_pixie("s1"));

    let outcome = town.answer(&request, "the first");
    assert_eq!(outcome.command().map(|c| c.intent), Some(Intent::GetMarketPriceInfo));
}

#[test]
fn single_price_check_offers_item_and_market_readings() {
    let town = Town::new();
    let request = town.ask(AMBIGUOUS_ITEM_PRICE, &town.at_pixie("s1"));

    assert_eq!(request.options, vec!["view market prices", "check an item's price"]);

    let outcome = town.answer(&request, "market");
    assert_eq!(outcome.command().map(|c| c.intent), Some(Intent::GetMarketPriceInfo));
}

#[test]
fn item_reading_without_an_item_is_not_dispatched() {
    let town = Town::new();
    let request = town.ask(AMBIGUOUS_ITEM_PRICE, &town.at_pixie("s1"));

    let outcome = town.answer(&request, "item price");
    let diagnostic = outcome.diagnostic().expect("rejected");
    assert!(matches!(diagnostic.reason, RejectionReason::ClarificationExhausted { .. }));
    assert_eq!(
        diagnostic.best_candidate.as_ref().map(|c| c.intent),
        Some(Intent::GetItemPrice)
    );
}

// =============================================================================
// Confirmation
// =============================================================================

#[test]
fn typo_is_confirmed_before_dispatch() {
    let town = Town::new();
    let request = town.ask("sell helth potion", &town.outside("s1"));

    assert_eq!(request.prompt, "Did you mean Health Potion? You want to sell something.");
    assert_eq!(request.options, vec!["yes", "no"]);

    let outcome = town.answer(&request, "yes");
    let command = outcome.command().expect("accepted");
    assert_eq!(command.entity_id("item"), Some(town.health));
    assert_eq!(command.slot("item").map(|s| s.origin), Some(SlotOrigin::Clarified));
}

#[test]
fn declined_suggestion_falls_back() {
    let town = Town::new();
    let request = town.ask("sell helth potion", &town.outside("s1"));

    let outcome = town.answer(&request, "no");
    assert_eq!(reason(&outcome), Some(&RejectionReason::ClarificationDeclined));
    assert!(outcome.signals_fallback());
    assert_eq!(
        outcome.diagnostic().map(|d| d.raw_input.as_str()),
        Some("sell helth potion")
    );
}

// =============================================================================
// Missing Slots
// =============================================================================

#[test]
fn browsing_outside_asks_for_the_shop() {
    let town = Town::new();
    let request = town.ask("browse", &town.outside("s1"));

    assert_eq!(request.prompt, "Which shop do you want to browse?");
    assert!(request.options.is_empty());

    let outcome = town.answer(&request, "the tipsy pixie");
    let command = outcome.command().expect("accepted");
    assert_eq!(command.intent, Intent::BrowseShop);
    assert_eq!(command.entity_id("shop"), Some(town.pixie));
}

#[test]
fn talking_outside_asks_for_the_person() {
    let town = Town::new();
    let request = town.ask("talk", &town.outside("s1"));

    assert_eq!(request.prompt, "Which person do you want to talk to?");
    let outcome = town.answer(&request, "marta");
    assert_eq!(outcome.command().and_then(|c| c.entity_id("npc")), Some(town.marta));
}

#[test]
fn strict_engine_asks_for_the_price() {
    let town = Town::with_config(EngineConfig::strict());
    let request = town.ask("buy 2 health potions from the Tipsy Pixie", &town.outside("s1"));

    assert_eq!(request.prompt, "For what price?");
    let outcome = town.answer(&request, "20 gold");
    let command = outcome.command().expect("accepted");
    assert_eq!(command.money("price"), Some(Money::gold(20)));
    assert_eq!(command.quantity("quantity"), Some(2));
}

#[test]
fn an_unreadable_price_is_not_an_answer() {
    let town = Town::with_config(EngineConfig::strict());
    let request = town.ask("buy 2 health potions from the Tipsy Pixie", &town.outside("s1"));

    let outcome = town.answer(&request, "whatever you think");
    assert_eq!(reason(&outcome), Some(&RejectionReason::UnansweredClarification));
}

// =============================================================================
// One Round Only
// =============================================================================

#[test]
fn weak_rule_is_still_rejected_after_the_answer() {
    let grammar = GrammarCompiler::compile(
        r#"
        (intent: sell-item :verbs [sell])
        (rule: sell/vague :intent sell-item :confidence 0.65 :pattern "<verb> ?item:item")
        "#,
    )
    .unwrap();
    let mut town = Town::new();
    town.engine = Engine::new(grammar, EngineConfig::default()).unwrap();

    let request = town.ask("sell potion", &town.outside("s1"));
    let outcome = town.answer(&request, "mana");

    match reason(&outcome) {
        Some(RejectionReason::ClarificationExhausted { confidence }) => {
            assert!((confidence - 0.65).abs() < 1e-9);
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(town.engine.pending_clarifications(), 0);
}

#[test]
fn new_input_drops_the_pending_question() {
    let town = Town::new();
    let request = town.ask("sell potion", &town.outside("s1"));

    let outcome = town.parse("check my balance", &town.outside("s1"));
    assert_eq!(outcome.command().map(|c| c.intent), Some(Intent::CheckBalance));
    assert_eq!(town.engine.pending_clarifications(), 0);

    let late = town.answer(&request, "mana");
    assert_eq!(reason(&late), Some(&RejectionReason::UnknownClarification));
}

#[test]
fn sessions_keep_their_own_questions() {
    let town = Town::new();
    let first = town.ask("sell potion", &town.outside("s1"));
    let second = town.ask("sell potion", &town.outside("s2"));
    assert_ne!(first.token, second.token);
    assert_eq!(town.engine.pending_clarifications(), 2);

    let a = town.answer(&second, "health");
    let b = town.answer(&first, "mana");
    assert_eq!(a.command().and_then(|c| c.entity_id("item")), Some(town.health));
    assert_eq!(b.command().and_then(|c| c.entity_id("item")), Some(town.mana));
    assert_eq!(a.command().map(|c| c.session.as_str()), Some("s2"));
}

#[test]
fn another_session_cannot_answer_the_question() {
    let town = Town::new();
    let request = town.ask("sell potion", &town.outside("s1"));
    assert_eq!(request.session.as_str(), "s1");

    let stolen = town.answer_as("s2", &request, "mana");
    assert_eq!(reason(&stolen), Some(&RejectionReason::UnknownClarification));
    assert_eq!(stolen.diagnostic().and_then(|d| d.session.as_ref()).map(|s| s.as_str()), Some("s2"));
    assert_eq!(town.engine.pending_clarifications(), 1);

    let outcome = town.answer_as("s1", &request, "mana");
    assert_eq!(outcome.command().and_then(|c| c.entity_id("item")), Some(town.mana));
}
