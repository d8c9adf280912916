//! Grammar layer for the haggle command engine.
//!
//! This crate turns raw player input into structural parse candidates.
//!
//! # Architecture
//!
//! ```text
//! "buy 2 health potions from the Tipsy Pixie"
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   TOKENIZER     │  → [buy, 2, health, potions, from, the, tipsy, pixie]
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ MATCHER         │  → buy-item/from-shop
//! │ (rules + verbs) │    {quantity: "2", item: "health potions", shop: "tipsy pixie"}
//! └─────────────────┘
//! ```
//!
//! Rules and verbs are declared in a small s-expression DSL and compiled
//! (and validated) once, at load.
//!
//! # Modules
//!
//! - [`tokenizer`] - Input normalization
//! - [`reader`] - S-expression reader for the grammar DSL
//! - [`pattern`] - Rule pattern compilation
//! - [`rule`] - Rules, rule set and verb table
//! - [`compiler`] - DSL to [`Grammar`] compilation and validation
//! - [`matcher`] - Matching tokens against rules

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compiler;
pub mod matcher;
pub mod pattern;
pub mod reader;
pub mod rule;
pub mod tokenizer;

pub use compiler::GrammarCompiler;
pub use matcher::{DEFAULT_MISSING_EXPECTED_PENALTY, Matcher, ParseCandidate, RawSlot};
pub use pattern::{ExtractionStrategy, PatternElement, SlotSpec};
pub use rule::{Grammar, GrammarRule, RuleSet, VerbTable};
pub use tokenizer::{Ordinal, Token, normalize};
