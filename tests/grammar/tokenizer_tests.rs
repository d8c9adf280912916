//! Tokenizer tests.
//!
//! Tests for converting raw input to token streams.

use haggle_foundation::Currency;
use haggle_grammar::tokenizer::{Ordinal, Token, join_tokens, normalize, ordinal_word};
use proptest::prelude::*;

fn word(w: &str) -> Token {
    Token::Word(w.to_string())
}

// =============================================================================
// Plain Input
// =============================================================================

#[test]
fn tokenize_purchase_command() {
    let tokens = normalize("Buy 2 Health Potions from the Tipsy Pixie");

    assert_eq!(
        tokens,
        vec![
            word("buy"),
            Token::Number(2),
            word("health"),
            word("potions"),
            word("from"),
            word("the"),
            word("tipsy"),
            word("pixie"),
        ]
    );
}

#[test]
fn tokenize_drops_question_marks_and_apostrophes() {
    let tokens = normalize("What's the weather like?");

    assert_eq!(tokens, vec![word("whats"), word("the"), word("weather"), word("like")]);
}

#[test]
fn tokenize_possessive_shop_name() {
    let text = join_tokens(&normalize("sell ore to Grumbold's Smithy"));

    assert_eq!(text, "sell ore to grumbolds smithy");
}

#[test]
fn tokenize_empty_and_noise_only_input() {
    assert!(normalize("").is_empty());
    assert!(normalize("  ,  ").is_empty());
    assert!(normalize("...?!").is_empty());
}

// =============================================================================
// Quantities and Money
// =============================================================================

#[test]
fn tokenize_times_and_gold_suffixes() {
    let tokens = normalize("sell 3x ore for 20g");

    assert_eq!(
        tokens,
        vec![
            word("sell"),
            Token::Number(3),
            word("ore"),
            word("for"),
            Token::Number(20),
            Token::Currency(Currency::Gold),
        ]
    );
}

#[test]
fn tokenize_spelled_out_currency() {
    let tokens = normalize("for 5 silver");

    assert_eq!(tokens[1], Token::Number(5));
    assert_eq!(tokens[2], Token::Currency(Currency::Silver));
}

#[test]
fn currency_word_without_amount_is_a_word() {
    let tokens = normalize("buy gold ore");

    assert_eq!(tokens, vec![word("buy"), word("gold"), word("ore")]);
}

#[test]
fn number_words_read_as_quantities() {
    let tokens = normalize("buy three apples");

    assert_eq!(tokens[1], word("three"));
    assert_eq!(tokens[1].as_number(), Some(3));
    assert_eq!(word("dozen").as_number(), Some(12));
    assert_eq!(word("apples").as_number(), None);
}

#[test]
fn ordinals_pick_positions() {
    assert_eq!(ordinal_word("first"), Some(Ordinal::Nth(1)));
    assert_eq!(ordinal_word("3rd"), Some(Ordinal::Nth(3)));
    assert_eq!(ordinal_word("last").and_then(|o| o.index(2)), Some(1));
    assert_eq!(Ordinal::Nth(1).index(0), None);
    assert_eq!(ordinal_word("potion"), None);
}

// =============================================================================
// Quoted Names
// =============================================================================

#[test]
fn quoted_name_is_one_token() {
    let tokens = normalize("buy \"Sword From The North\" from bob");

    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[1], Token::Quoted("sword from the north".to_string()));
    assert!(tokens[1].is_nominal());
    assert!(!Token::Number(1).is_nominal());
}

#[test]
fn unterminated_quote_runs_to_end() {
    let tokens = normalize("sell \"old boots");

    assert_eq!(tokens, vec![word("sell"), Token::Quoted("old boots".to_string())]);
}

#[test]
fn empty_quotes_vanish() {
    assert_eq!(normalize("sell \"\" ore"), vec![word("sell"), word("ore")]);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn tokenize_never_panics(input in "\\PC{0,80}") {
        let _ = normalize(&input);
    }

    #[test]
    fn rendering_tokens_is_stable(input in "[a-z0-9 ]{0,40}") {
        let once = normalize(&input);
        prop_assert_eq!(normalize(&join_tokens(&once)), once);
    }

    #[test]
    fn case_does_not_matter(input in "[a-zA-Z ]{0,40}") {
        prop_assert_eq!(normalize(&input), normalize(&input.to_lowercase()));
    }
}
