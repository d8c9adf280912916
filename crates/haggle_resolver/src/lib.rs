//! Entity resolution layer for the haggle command engine.
//!
//! This crate turns the raw slot text of a [`ParseCandidate`](haggle_grammar::ParseCandidate)
//! into typed values, using world state reached through two narrow
//! collaborator traits.
//!
//! # Architecture
//!
//! ```text
//! ParseCandidate {item: "potion", shop: <default>}
//!          │
//!          ▼
//! ┌──────────────────┐    ┌──────────────────┐
//! │ VOCABULARY       │───▶│ EntityLookup     │  (one query per kind/scope)
//! │ (per-call index) │    └──────────────────┘
//! └──────────────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ RESOLVER         │  → item: Health Potion (0.85, in shop stock)
//! │ (fuzzy, context) │    shop: The Tipsy Pixie (defaulted)
//! └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`lookup`] - Collaborator traits and records
//! - [`memory`] - In-memory collaborators for tests and demos
//! - [`config`] - Fuzzy matching constants
//! - [`fuzzy`] - Name normalization and similarity scoring
//! - [`vocabulary`] - Verb table access and per-call noun indexing
//! - [`resolver`] - Slot resolution

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod fuzzy;
pub mod lookup;
pub mod memory;
pub mod resolver;
pub mod vocabulary;

pub use config::ResolverConfig;
pub use fuzzy::{MatchKind, MatchScore, SurfaceKey};
pub use lookup::{ContextProvider, EntityLookup, EntityRecord, LookupError, LookupScope};
pub use memory::InMemoryWorld;
pub use resolver::{
    EntityRef, EntityResolver, RankedRef, Resolution, ResolvedCandidate, ResolvedSlot, SlotOrigin, SlotValue,
    UnresolvedCause,
};
pub use vocabulary::{IndexedNoun, NounCandidates, NounIndex, VocabularyRegistry};
