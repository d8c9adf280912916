//! End-to-end parse scenarios.

use haggle_engine::{DispatchState, EngineConfig, ParseOutcome, RejectionReason};
use haggle_foundation::{EntityKind, Intent, Money, SessionId};
use haggle_resolver::UnresolvedCause;

use crate::town::Town;

// =============================================================================
// Reference Scenarios
// =============================================================================

#[test]
fn buying_from_a_named_shop_is_accepted() {
    let town = Town::new();
    let outcome = town.parse("buy 2 health potions from the Tipsy Pixie", &town.outside("s1"));

    let command = outcome.command().expect("accepted");
    assert_eq!(command.intent, Intent::BuyItem);
    assert_eq!(command.quantity("quantity"), Some(2));
    assert_eq!(command.entity_id("item"), Some(town.health));
    assert_eq!(command.entity_id("shop"), Some(town.pixie));
    assert!(command.overall_confidence >= 0.85);
    assert!(!command.clarified);
}

#[test]
fn crafting_a_known_recipe_is_accepted() {
    let town = Town::new();
    let outcome = town.parse("craft steel sword", &town.outside("s1"));

    let command = outcome.command().expect("accepted");
    assert_eq!(command.intent, Intent::CraftFromRecipe);
    assert_eq!(command.entity_id("recipe"), Some(town.sword_recipe));
}

#[test]
fn selling_an_ambiguous_potion_asks_which() {
    let town = Town::new();
    let request = town.ask("sell potion", &town.outside("s1"));

    assert_eq!(request.options, vec!["Health Potion", "Mana Potion"]);
    assert_eq!(request.prompt, "Which item do you want to sell: Health Potion or Mana Potion?");
    assert_eq!(town.engine.pending_clarifications(), 1);
}

#[test]
fn small_talk_falls_back_and_is_logged() {
    let town = Town::new();
    let outcome = town.parse("what's the weather like", &town.outside("s1"));

    assert_eq!(outcome.state(), DispatchState::Rejected);
    assert!(outcome.signals_fallback());
    let diagnostic = outcome.diagnostic().expect("diagnostic");
    assert_eq!(diagnostic.reason, RejectionReason::NoMatchingRule);
    assert_eq!(diagnostic.session, Some(SessionId::new("s1")));
    assert!(diagnostic.best_candidate.is_none());

    let report = town.log.report();
    assert_eq!(report.rejected, 1);
    assert_eq!(report.unmatched, vec![("what's the weather like".to_string(), 1)]);
}

// =============================================================================
// Other Intents
// =============================================================================

#[test]
fn price_change_for_own_stock() {
    let town = Town::new();
    let outcome = town.parse("set the price of fresh bread to 5 gold", &town.outside("s1"));

    let command = outcome.command().expect("accepted");
    assert_eq!(command.intent, Intent::SetProductPrice);
    assert_eq!(command.entity_id("item"), Some(town.bread));
    assert_eq!(command.money("price"), Some(Money::gold(5)));
}

#[test]
fn construction_on_a_local_plot() {
    let town = Town::new();
    let outcome = town.parse("build a workshop on the north field", &town.outside("s1"));

    let command = outcome.command().expect("accepted");
    assert_eq!(command.entity_id("building"), Some(town.workshop));
    assert_eq!(command.entity_id("plot"), Some(town.north_field));
}

#[test]
fn hiring_for_an_owned_business() {
    let town = Town::new();
    let outcome = town.parse("hire marta for the Riverside Bakery", &town.outside("s1"));

    let command = outcome.command().expect("accepted");
    assert_eq!(command.intent, Intent::HireWorker);
    assert_eq!(command.entity_id("npc"), Some(town.marta));
    assert_eq!(command.entity_id("business"), Some(town.bakery));
}

#[test]
fn market_report_for_an_unstocked_item() {
    let town = Town::new();
    let outcome = town.parse("market prices for iron ore", &town.outside("s1"));

    assert_eq!(outcome.command().and_then(|c| c.entity_id("item")), Some(town.ore));
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn blank_and_noise_only_input_is_malformed() {
    let town = Town::new();

    for input in ["", "   ", "please", "?!"] {
        let outcome = town.parse(input, &town.outside("s1"));
        assert_eq!(
            outcome.diagnostic().map(|d| &d.reason),
            Some(&RejectionReason::MalformedInput),
            "{input:?}"
        );
    }
}

#[test]
fn overlong_input_is_malformed_before_matching() {
    let town = Town::with_config(EngineConfig::default().with_max_input_tokens(8));
    let outcome = town.parse("buy a health potion", &town.at_pixie("s1"));
    assert!(outcome.command().is_some(), "{outcome:?}");

    let rambling = format!("buy {}", "health potion ".repeat(20));
    let outcome = town.parse(&rambling, &town.at_pixie("s1"));
    let diagnostic = outcome.diagnostic().expect("rejected");
    assert_eq!(diagnostic.reason, RejectionReason::MalformedInput);
    assert!(diagnostic.best_candidate.is_none());
}

#[test]
fn unknown_item_is_reported_with_its_text() {
    let town = Town::new();
    let outcome = town.parse("buy a dragon egg", &town.at_pixie("s1"));

    let diagnostic = outcome.diagnostic().expect("rejected");
    assert_eq!(
        diagnostic.reason,
        RejectionReason::UnresolvedSlot {
            slot: "item".to_string(),
            kind: EntityKind::Item,
            raw: "dragon egg".to_string(),
            cause: UnresolvedCause::NoMatch,
        }
    );
    assert_eq!(
        diagnostic.best_candidate.as_ref().map(|c| c.rule_id.as_str()),
        Some("buy-item/bare")
    );
}

#[test]
fn crowded_matches_offer_the_best_three() {
    let mut town = Town::new();
    for name in ["Fire Potion", "Frost Potion"] {
        let potion = town.world.add(EntityKind::Item, name);
        town.world.give(town.player, potion);
    }
    let request = town.ask("sell potion", &town.outside("s1"));

    assert_eq!(request.options.len(), 3);
    assert!(request.options.iter().all(|o| o.ends_with("Potion")));
    assert_eq!(town.engine.pending_clarifications(), 1);

    let chosen = request.options[2].clone();
    let command = town.answer(&request, "the third").command().cloned().expect("accepted");
    assert_eq!(command.intent, Intent::SellItem);
    assert_eq!(command.entity("item").map(|e| e.display_name.clone()), Some(chosen));
}

#[test]
fn two_ambiguous_slots_are_rejected() {
    let mut town = Town::new();
    for name in ["North Smithy", "South Smithy"] {
        let smithy = town.world.add(EntityKind::Shop, name);
        town.world.place(smithy, town.market);
    }
    let outcome = town.parse("sell potion to the smithy", &town.outside("s1"));

    assert_eq!(
        outcome.diagnostic().map(|d| &d.reason),
        Some(&RejectionReason::MultipleAmbiguousSlots {
            slots: vec!["item".to_string(), "shop".to_string()],
        })
    );
}

#[test]
fn unknown_session_has_no_context() {
    let mut town = Town::new();
    let session = SessionId::new("s1");

    let outcome = town.engine.parse_session("check my balance", &session, &town.world, &town.world);
    assert!(matches!(
        outcome.diagnostic().map(|d| &d.reason),
        Some(RejectionReason::ContextUnavailable { .. })
    ));

    town.world.set_context(town.outside("s1"));
    let outcome = town.engine.parse_session("check my balance", &session, &town.world, &town.world);
    assert!(matches!(outcome, ParseOutcome::Accepted(ref c) if c.intent == Intent::CheckBalance));
}
