//! Multi-turn sessions.

use haggle_engine::{RejectionReason, ServiceCall};
use haggle_foundation::{EntityKind, Intent, Money};
use haggle_resolver::UnresolvedCause;
use haggle_runtime::{Response, RuntimeConfig, STARTING_GOLD, Session};

fn session() -> Session {
    Session::new(&RuntimeConfig::default()).unwrap()
}

fn fallback_reason(response: &Response) -> Option<&RejectionReason> {
    match response {
        Response::Fallback(diagnostic) => Some(&diagnostic.reason),
        _ => None,
    }
}

#[test]
fn next_line_answers_the_question() {
    let mut session = session();

    let question = session.submit("sell potion");
    assert!(matches!(&question, Response::Question(q) if q.options == ["Health Potion", "Mana Potion"]));
    assert!(session.pending().is_some());

    let answer = session.submit("mana");
    assert!(session.pending().is_none());
    let mana = session.demo().named(EntityKind::Item, "Mana Potion");
    match answer.call() {
        Some(ServiceCall::Sale(sale)) => {
            assert_eq!(Some(sale.item), mana);
            assert_eq!(sale.shop, Some(session.demo().pixie));
        }
        other => panic!("expected a sale, got {other:?}"),
    }
    assert_eq!(session.turns(), 2);
}

#[test]
fn abandoned_question_leaves_the_next_line_alone() {
    let mut session = session();
    session.submit("sell potion");
    assert!(session.abandon_question());
    assert!(!session.abandon_question());

    let response = session.submit("check my balance");
    assert_eq!(response.command().map(|c| c.intent), Some(Intent::CheckBalance));
    assert_eq!(session.engine().pending_clarifications(), 0);
}

#[test]
fn leaving_the_counter_changes_what_is_asked() {
    let mut session = session();
    assert!(matches!(session.submit("browse").call(), Some(ServiceCall::Browse(_))));

    session.leave();
    match session.submit("browse") {
        Response::Question(question) => assert_eq!(question.prompt, "Which shop do you want to browse?"),
        other => panic!("expected a question, got {other:?}"),
    }
    let smithy = session.demo().smithy;
    assert!(matches!(session.submit("smithy").call(), Some(ServiceCall::Browse(b)) if b.shop == smithy));
}

#[test]
fn entering_a_shop_scopes_purchases() {
    let mut session = session();
    let smithy = session.enter_shop("grumbold's smithy");
    assert_eq!(smithy, Some(session.demo().smithy));
    assert_eq!(session.enter_shop("the moon"), None);

    let response = session.submit("buy a steel ingot");
    match response.call() {
        Some(ServiceCall::Purchase(purchase)) => {
            assert_eq!(purchase.shop, smithy);
            assert_eq!(purchase.quantity, 1);
        }
        other => panic!("expected a purchase, got {other:?}"),
    }
}

#[test]
fn talking_partner_fills_the_npc() {
    let mut session = session();
    let marta = session.talk_to("marta");
    assert!(marta.is_some());

    match session.submit("talk").call() {
        Some(ServiceCall::Talk(talk)) => assert_eq!(Some(talk.npc), marta),
        other => panic!("expected a conversation, got {other:?}"),
    }
}

#[test]
fn lookup_outage_falls_back() {
    let mut session = session();
    session.demo_mut().world_mut().fail_kind(EntityKind::Item);

    let response = session.submit("buy a mana potion");
    assert!(matches!(
        fallback_reason(&response),
        Some(RejectionReason::UnresolvedSlot {
            cause: UnresolvedCause::CollaboratorUnavailable,
            ..
        })
    ));

    session.demo_mut().world_mut().restore_kind(EntityKind::Item);
    assert!(session.submit("buy a mana potion").is_dispatched());
}

#[test]
fn rendering() {
    let mut session = session();

    let response = session.submit("buy 2 health potions from the Tipsy Pixie");
    let text = session.render(&response);
    assert!(text.starts_with("trade: buy 2 x Health Potion from The Tipsy Pixie  [buy-item/from-shop"), "{text}");

    let json = Session::render_json(&response).unwrap();
    assert!(json.starts_with(r#"{"type":"dispatched""#), "{json}");

    let fallback = session.submit("what's the weather like");
    assert_eq!(session.render(&fallback), "(fallback) no grammar rule matched");

    let described = session.describe_context();
    assert!(described.contains("at The Tipsy Pixie"), "{described}");
    assert!(described.contains(&Money::gold(STARTING_GOLD).to_string()), "{described}");
}
