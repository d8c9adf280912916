//! Runtime configuration files and grammar extensions.

use std::fs;

use haggle_engine::ServiceCall;
use haggle_foundation::ErrorKind;
use haggle_runtime::{Response, RuntimeConfig, Session};

const HAGGLE_RULE: &str = r#"
(rule: buy-item/haggle
  :intent buy-item
  :confidence 0.93
  :defaults [shop]
  :pattern "haggle for [?quantity:number] ?item:item [from|at ?shop:shop]")
"#;

#[test]
fn config_file_drives_the_session() {
    let path = std::env::temp_dir().join(format!("haggle-{}-runtime.json", std::process::id()));
    fs::write(
        &path,
        r#"{
            "session": "alice",
            "engine": { "policy": { "accept_threshold": 0.95, "clarify_threshold": 0.6 } }
        }"#,
    )
    .unwrap();
    let config = RuntimeConfig::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.session, "alice");
    let mut session = Session::new(&config).unwrap();
    assert_eq!(session.id().as_str(), "alice");

    // The bare purchase rule no longer clears the raised threshold.
    assert!(matches!(session.submit("buy a mana potion"), Response::Question(_)));
}

#[test]
fn grammar_extension_adds_a_phrasing() {
    let config = RuntimeConfig {
        grammar_extension: Some(HAGGLE_RULE.to_string()),
        ..RuntimeConfig::default()
    };
    let mut session = Session::new(&config).unwrap();

    let response = session.submit("haggle for 2 iron ore");
    assert_eq!(response.command().map(|c| c.rule_id.as_str()), Some("buy-item/haggle"));
    match response.call() {
        Some(ServiceCall::Purchase(purchase)) => {
            assert_eq!(purchase.quantity, 2);
            assert_eq!(purchase.shop, Some(session.demo().pixie));
        }
        other => panic!("expected a purchase, got {other:?}"),
    }
}

#[test]
fn extension_defaulting_an_undeclared_slot_is_refused() {
    let config = RuntimeConfig {
        grammar_extension: Some(HAGGLE_RULE.replace(" [from|at ?shop:shop]", "")),
        ..RuntimeConfig::default()
    };
    let err = Session::new(&config).unwrap_err();
    assert!(err.is_configuration(), "{err}");
    assert!(err.to_string().contains("defaults unknown slot"), "{err}");
}

#[test]
fn broken_extension_is_a_configuration_error() {
    let config = RuntimeConfig {
        grammar_extension: Some("(rule: buy-item/bare :intent buy-item :pattern \"<verb> ?item:item\")".to_string()),
        ..RuntimeConfig::default()
    };
    let err = Session::new(&config).unwrap_err();
    assert!(err.is_configuration(), "{err}");
}

#[test]
fn unreadable_config_names_the_file() {
    let path = std::env::temp_dir().join(format!("haggle-{}-broken.json", std::process::id()));
    fs::write(&path, "{ \"session\": ").unwrap();
    let err = RuntimeConfig::load(&path).unwrap_err();
    fs::remove_file(&path).ok();

    assert!(matches!(err.kind, ErrorKind::Serialization(_)));
    assert!(err.context.as_deref().is_some_and(|c| c.contains("broken.json")));
}
