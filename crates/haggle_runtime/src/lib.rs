//! REPL, demo world and CLI for the haggle command engine.
//!
//! This crate provides:
//! - [`Repl`] - Interactive read-eval-print loop and script runner
//! - [`Session`] - One player's engine, world and clarification state
//! - [`DemoWorld`] - A small market town to parse against
//! - [`RuntimeConfig`] - JSON configuration for all of the above

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod demo;
pub mod editor;
pub mod repl;
pub mod session;

pub use config::RuntimeConfig;
pub use demo::{DemoWorld, STARTING_GOLD};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Repl, Step};
pub use session::{Response, Session};
