//! Coverage logging and diagnostics export for the haggle command engine.
//!
//! This crate provides:
//! - [`CoverageLog`] - A ring buffer of engine events that is itself a
//!   [`DiagnosticSink`](haggle_engine::DiagnosticSink)
//! - [`CoverageReport`] - Per-rule and per-intent aggregation
//! - Human-readable and JSON formatters
//! - `MessagePack` export and import
//! - [`TracingSink`] and [`FanoutSink`] for routing events

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod coverage;
pub mod sink;

pub use config::CoverageConfig;
pub use coverage::{
    CoverageBuffer, CoverageBufferStats, CoverageFormatter, CoverageLog, CoverageRecord, CoverageReport,
    HumanFormatter, JsonFormatter, RuleCoverage,
};
pub use sink::{FanoutSink, TracingSink};
