//! Decision layer for the haggle command engine.
//!
//! Takes resolved candidates, decides whether to dispatch, ask or fall back,
//! and turns dispatched commands into service calls.
//!
//! # Architecture
//!
//! ```text
//! resolved candidates
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ POLICY          │  ACCEPT ≥ 0.85 │ CLARIFY ≥ 0.5 │ REJECT
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │ DISPATCH        │───▶│ CLARIFICATION   │  (one question per session)
//! │ (Engine)        │◀───│ STORE           │
//! └─────────────────┘    └─────────────────┘
//!          │
//!          ▼
//! ResolvedCommand ──▶ ActionFormulator ──▶ ServiceCall
//! ```
//!
//! # Modules
//!
//! - [`config`] - Thresholds and limits
//! - [`policy`] - Scoring, classification and ranking
//! - [`clarification`] - Suspended clarification state
//! - [`diagnostics`] - Rejection diagnostics and the sink interface
//! - [`command`] - Resolved commands
//! - [`dispatch`] - The [`Engine`]
//! - [`action`] - Service call formulation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod clarification;
pub mod command;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod policy;

pub use action::{ActionFormulator, FormulationError, Service, ServiceCall};
pub use clarification::{ClarificationStore, ClarificationToken, PendingClarification};
pub use command::{CommandSource, FALLBACK_RULE_ID, ResolvedCommand};
pub use config::{ClarificationConfig, EngineConfig, PolicyConfig};
pub use diagnostics::{CandidateSummary, Diagnostic, DiagnosticEvent, DiagnosticSink, NullSink, RejectionReason};
pub use dispatch::{ClarificationRequest, DispatchState, Engine, ParseOutcome};
pub use policy::{ClarificationTarget, ConfidencePolicy, Decision, ScoredCandidate};
