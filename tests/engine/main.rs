//! Integration tests for the haggle_engine crate.
//!
//! Tests for the decision layer over the standard grammar:
//! - End-to-end parse scenarios
//! - Clarification questions and answers
//! - Clarification store limits (time-to-live, capacity)
//! - Service call formulation
//! - Determinism

mod clarification_flows;
mod formulation;
mod properties;
mod scenarios;
mod store_limits;
mod town;
