//! Grammar DSL validation tests.
//!
//! Broken grammars must fail at load with a configuration error, never
//! at parse time.

use haggle_foundation::ErrorKind;
use haggle_grammar::{GrammarCompiler, Matcher};
use haggle_stdlib::{economy_grammar, extended_grammar};

const VERBS: &str = "(intent: buy-item :verbs [buy purchase])";

fn compile(rules: &str) -> haggle_foundation::Result<haggle_grammar::Grammar> {
    GrammarCompiler::compile(&format!("{VERBS}\n{rules}"))
}

fn kind_of(rules: &str) -> ErrorKind {
    match compile(rules) {
        Ok(_) => panic!("expected {rules:?} to be rejected"),
        Err(err) => {
            assert!(err.is_configuration(), "{err} is not a configuration error");
            err.kind
        }
    }
}

// =============================================================================
// Reader Errors
// =============================================================================

#[test]
fn unbalanced_parenthesis_reports_position() {
    let err = GrammarCompiler::compile("(intent: buy-item :verbs [buy]\n(rule: x").unwrap_err();

    assert!(matches!(err.kind, ErrorKind::DslSyntax { .. }));
    assert!(err.to_string().starts_with("grammar syntax error at"));
}

#[test]
fn empty_source_has_no_rules() {
    let err = GrammarCompiler::compile("; nothing here\n").unwrap_err();

    assert!(matches!(err.kind, ErrorKind::InvalidGrammar { rule: None, .. }));
}

// =============================================================================
// Rule Errors
// =============================================================================

#[test]
fn unknown_intent_is_rejected() {
    let kind = kind_of(r#"(rule: x :intent haggle-item :confidence 0.9 :pattern "buy ?item:item")"#);

    assert!(matches!(kind, ErrorKind::UnknownIntent(ref name) if name == "haggle-item"));
}

#[test]
fn unknown_slot_kind_is_rejected() {
    let kind = kind_of(r#"(rule: x :intent buy-item :confidence 0.9 :pattern "<verb> ?item:potion")"#);

    assert!(matches!(kind, ErrorKind::UnknownSlotKind(ref name) if name == "potion"));
}

#[test]
fn duplicate_rule_id_is_rejected() {
    let kind = kind_of(
        r#"(rule: buy :intent buy-item :confidence 0.9 :pattern "<verb> ?item:item")
           (rule: buy :intent buy-item :confidence 0.9 :pattern "<verb> ?item:item from ?shop:shop")"#,
    );

    assert!(matches!(kind, ErrorKind::DuplicateRule(ref id) if id == "buy"));
}

#[test]
fn confidence_must_be_in_range() {
    for value in ["0", "1.01", "7"] {
        let kind = kind_of(&format!(
            r#"(rule: x :intent buy-item :confidence {value} :pattern "<verb> ?item:item")"#
        ));
        assert!(matches!(kind, ErrorKind::InvalidGrammar { rule: Some(ref r), .. } if r == "x"), "{value}");
    }
}

#[test]
fn pattern_may_not_open_with_a_slot() {
    let kind = kind_of(r#"(rule: x :intent buy-item :confidence 0.9 :pattern "?item:item please")"#);

    assert!(matches!(kind, ErrorKind::InvalidPattern { ref rule, .. } if rule == "x"));
}

#[test]
fn adjacent_spans_are_ambiguous() {
    let kind = kind_of(r#"(rule: x :intent buy-item :confidence 0.9 :pattern "<verb> ?item:item ?shop:shop")"#);

    assert!(matches!(kind, ErrorKind::InvalidPattern { .. }));
}

#[test]
fn verb_class_needs_declared_verbs() {
    let kind = kind_of(r#"(rule: x :intent sell-item :confidence 0.9 :pattern "<verb> ?item:item")"#);

    assert!(matches!(kind, ErrorKind::InvalidPattern { ref message, .. } if message.contains("has no verbs")));
}

#[test]
fn mandatory_slots_cannot_be_expected() {
    let kind = kind_of(r#"(rule: x :intent buy-item :confidence 0.9 :expects [item] :pattern "<verb> ?item:item")"#);

    assert!(matches!(kind, ErrorKind::InvalidGrammar { .. }));
}

// =============================================================================
// Extending the Standard Grammar
// =============================================================================

#[test]
fn standard_grammar_compiles_cleanly() {
    let grammar = GrammarCompiler::compile(&economy_grammar()).unwrap();

    assert!(grammar.rules.len() >= 13);
}

#[test]
fn extension_rules_join_the_standard_set() {
    let grammar = extended_grammar(
        r#"(rule: buy-item/haggle :intent buy-item :confidence 0.8
             :pattern "haggle for [?quantity:number] ?item:item")"#,
    )
    .unwrap();

    let candidates = Matcher::new(&grammar).match_input("haggle for 2 iron ore");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].rule_id, "buy-item/haggle");
    assert_eq!(candidates[0].slot("item").map(|s| s.text.as_str()), Some("iron ore"));
}

#[test]
fn extension_cannot_shadow_standard_rule() {
    let err = extended_grammar(r#"(rule: sell-item/bare :intent sell-item :confidence 0.5 :pattern "dump ?item:item")"#)
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::DuplicateRule(ref id) if id == "sell-item/bare"));
}
