//! Integration tests for the haggle_resolver crate.
//!
//! Tests for turning slot text into entities:
//! - Fuzzy and exact name matching
//! - Context priority (shop stock, inventory, known recipes)
//! - Lookup batching and degradation when a collaborator fails

mod context_priority;
mod fixture;
mod fuzzy_resolution;
