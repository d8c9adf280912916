//! Clarification store limits.

use std::thread;
use std::time::Duration;

use haggle_engine::{EngineConfig, RejectionReason};
use haggle_foundation::SessionId;
use haggle_stdlib::standard_engine;

use crate::town::Town;

#[test]
fn late_answers_expire() {
    let town = Town::with_config(EngineConfig::default().with_clarification_ttl(Duration::from_millis(5)));
    let request = town.ask("sell potion", &town.outside("s1"));

    thread::sleep(Duration::from_millis(30));
    let outcome = town.answer(&request, "mana");

    let diagnostic = outcome.diagnostic().expect("rejected");
    assert_eq!(diagnostic.reason, RejectionReason::ClarificationExpired);
    assert_eq!(diagnostic.session, Some(SessionId::new("s1")));
    assert_eq!(town.engine.pending_clarifications(), 0);
}

#[test]
fn full_store_drops_the_oldest_question() {
    let town = Town::with_config(EngineConfig::default().with_max_pending(2));
    let first = town.ask("sell potion", &town.outside("s1"));
    let _second = town.ask("sell potion", &town.outside("s2"));
    let third = town.ask("sell potion", &town.outside("s3"));

    assert_eq!(town.engine.pending_clarifications(), 2);
    let dropped = town.answer(&first, "mana");
    assert_eq!(
        dropped.diagnostic().map(|d| &d.reason),
        Some(&RejectionReason::UnknownClarification)
    );
    assert!(town.answer(&third, "mana").command().is_some());
}

#[test]
fn tokens_are_stable_per_session_and_input() {
    let town = Town::new();
    let first = town.ask("sell potion", &town.outside("s1"));
    let again = town.ask("sell potion", &town.outside("s1"));
    let other = town.ask("sell potion", &town.outside("s2"));

    assert_eq!(first.token, again.token);
    assert_ne!(first.token, other.token);
    assert!(first.token.as_str().starts_with("clr-"));
}

#[test]
fn unordered_thresholds_are_refused() {
    let config = EngineConfig::default()
        .with_accept_threshold(0.3)
        .with_clarify_threshold(0.5);

    match standard_engine(config) {
        Err(err) => assert!(err.is_configuration(), "{err}"),
        Ok(_) => panic!("thresholds out of order were accepted"),
    }
}

#[test]
fn zero_capacity_is_refused() {
    let config = EngineConfig::default().with_max_pending(0);
    assert!(EngineConfig::validate(&config).is_err());
}
