//! Standard economy grammar for the haggle command engine.
//!
//! This crate provides the stock vocabulary and rules:
//! - Fillers and preambles ("please", "i want to")
//! - Verbs for all thirteen intents
//! - Rules for trade, production, personal queries and prices
//! - Example inputs used by tests and benchmarks
//!
//! ```text
//! economy_grammar() ──▶ GrammarCompiler ──▶ Grammar ──▶ Engine
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod corpus;
pub mod grammar;

use haggle_engine::{Engine, EngineConfig};
use haggle_foundation::Result;
use haggle_grammar::{Grammar, GrammarCompiler};

pub use corpus::{AMBIGUOUS_ITEM_PRICE, AMBIGUOUS_PRICE_CHECK, CANONICAL, Example, PARAPHRASES};
pub use grammar::economy_grammar;

/// Compiles the standard grammar.
///
/// # Errors
///
/// Only fails if the bundled DSL is broken.
pub fn standard_grammar() -> Result<Grammar> {
    let grammar = GrammarCompiler::compile(&economy_grammar())?;
    tracing::debug!(rules = grammar.rules.len(), "loaded standard economy grammar");
    Ok(grammar)
}

/// Compiles the standard grammar, then extends it with game-specific DSL.
///
/// The extra source may add fillers, preambles, verbs and rules; rule ids
/// must not collide with the standard ones.
///
/// # Errors
///
/// Returns an error if the combined source does not compile.
pub fn extended_grammar(extra: &str) -> Result<Grammar> {
    GrammarCompiler::compile(&format!("{}\n{extra}", economy_grammar()))
}

/// Builds an engine over the standard grammar.
///
/// # Errors
///
/// Returns an error if `config` is invalid.
pub fn standard_engine(config: EngineConfig) -> Result<Engine> {
    Engine::new(standard_grammar()?, config)
}
