//! Haggle - command parsing and entity resolution for economic game commands
//!
//! This crate re-exports all layers of the haggle system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: haggle_runtime    — REPL, CLI, demo world
//!          haggle_debug      — Coverage log, reports, exports
//! Layer 3: haggle_stdlib     — Standard economy grammar and example corpus
//! Layer 2: haggle_engine     — Confidence policy, clarification, dispatch, actions
//! Layer 1: haggle_resolver   — Vocabulary registry, fuzzy entity resolution
//!          haggle_grammar    — Tokenizer, grammar DSL, rule matcher
//! Layer 0: haggle_foundation — Core types (EntityId, Intent, ParseContext, Error)
//! ```

pub use haggle_debug as debug;
pub use haggle_engine as engine;
pub use haggle_foundation as foundation;
pub use haggle_grammar as grammar;
pub use haggle_resolver as resolver;
pub use haggle_runtime as runtime;
pub use haggle_stdlib as stdlib;
