//! Core types for the haggle command engine.
//!
//! This crate provides:
//! - [`EntityId`] and [`EntityKind`] - references to world entities
//! - [`Intent`] - the closed set of recognizable command kinds
//! - [`Money`] and [`Currency`] - prices and balances
//! - [`ParseContext`] - the caller-supplied, read-only view of a player's situation
//! - [`Error`] - rich error types for load-time failures
//! - Persistent id sets ([`IdSet`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod context;
pub mod entity;
pub mod error;
pub mod intent;
pub mod money;

pub use collections::IdSet;
pub use context::{InteractionTarget, ParseContext, ScopeKey, SessionId};
pub use entity::{EntityId, EntityKind};
pub use error::{Error, ErrorKind, Result};
pub use intent::Intent;
pub use money::{Currency, Money};
