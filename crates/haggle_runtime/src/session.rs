//! A player session against the demo world.
//!
//! The session owns the engine, the world and the player's context. It keeps
//! at most one outstanding question: the next submitted line answers it.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Serialize;

use haggle_debug::{CoverageLog, FanoutSink, TracingSink};
use haggle_engine::{
    ActionFormulator, ClarificationRequest, Diagnostic, Engine, ParseOutcome, ResolvedCommand, ServiceCall,
};
use haggle_foundation::{EntityId, EntityKind, Error, ErrorKind, InteractionTarget, ParseContext, Result, SessionId};
use haggle_stdlib::{extended_grammar, standard_grammar};

use crate::config::RuntimeConfig;
use crate::demo::DemoWorld;

/// What the session did with one line.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    /// The command was accepted and turned into a service call.
    Dispatched {
        /// The accepted command.
        command: ResolvedCommand,
        /// The call handed to the game service.
        call: ServiceCall,
    },
    /// The engine needs an answer before it can dispatch.
    Question(ClarificationRequest),
    /// The input goes to the fallback interpreter.
    Fallback(Diagnostic),
    /// The command was accepted but no service call could be built from it.
    Unserviceable {
        /// The accepted command.
        command: ResolvedCommand,
        /// Why formulation failed.
        error: String,
    },
}

impl Response {
    /// Returns true if a service call was produced.
    #[must_use]
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }

    /// The service call, if one was produced.
    #[must_use]
    pub fn call(&self) -> Option<&ServiceCall> {
        match self {
            Self::Dispatched { call, .. } => Some(call),
            _ => None,
        }
    }

    /// The accepted command, if any.
    #[must_use]
    pub fn command(&self) -> Option<&ResolvedCommand> {
        match self {
            Self::Dispatched { command, .. } | Self::Unserviceable { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// A player typing commands.
pub struct Session {
    id: SessionId,
    engine: Engine,
    demo: DemoWorld,
    context: ParseContext,
    coverage: Arc<CoverageLog>,
    formulator: ActionFormulator,
    pending: Option<ClarificationRequest>,
    turns: usize,
}

impl Session {
    /// Builds a session over the standard grammar and the demo world.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar extension does not compile or the
    /// engine configuration is invalid.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let grammar = match &config.grammar_extension {
            Some(extra) => extended_grammar(extra)?,
            None => standard_grammar()?,
        };
        let coverage = Arc::new(CoverageLog::new(config.coverage.clone()));
        let sink = FanoutSink::new().with(coverage.clone()).with(Arc::new(TracingSink));
        let engine = Engine::new(grammar, config.engine.clone())?.with_sink(Arc::new(sink));

        let id = SessionId::new(config.session.clone());
        let mut demo = DemoWorld::new();
        let context = demo.context(id.clone());
        demo.world_mut().set_context(context.clone());
        tracing::debug!(session = %id, "session started");

        Ok(Self {
            id,
            engine,
            demo,
            context,
            coverage,
            formulator: ActionFormulator::new(),
            pending: None,
            turns: 0,
        })
    }

    /// The session id.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The demo world.
    #[must_use]
    pub fn demo(&self) -> &DemoWorld {
        &self.demo
    }

    /// Mutable access to the demo world.
    pub fn demo_mut(&mut self) -> &mut DemoWorld {
        &mut self.demo
    }

    /// The player's current context.
    #[must_use]
    pub fn context(&self) -> &ParseContext {
        &self.context
    }

    /// The coverage log fed by the engine.
    #[must_use]
    pub fn coverage(&self) -> &Arc<CoverageLog> {
        &self.coverage
    }

    /// The question awaiting an answer, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&ClarificationRequest> {
        self.pending.as_ref()
    }

    /// Number of lines submitted.
    #[must_use]
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Handles one line of player input.
    ///
    /// If a question is outstanding the line is taken as its answer;
    /// otherwise it is parsed as a new command.
    pub fn submit(&mut self, line: &str) -> Response {
        self.turns += 1;
        let outcome = match self.pending.take() {
            Some(question) => self
                .engine
                .resume_clarification(&self.id, &question.token, line, self.demo.world()),
            None => self
                .engine
                .parse_session(line, &self.id, self.demo.world(), self.demo.world()),
        };
        self.respond(outcome)
    }

    /// Drops the outstanding question, returning true if there was one.
    ///
    /// The engine forgets it on the next parse.
    pub fn abandon_question(&mut self) -> bool {
        self.pending.take().is_some()
    }

    fn respond(&mut self, outcome: ParseOutcome) -> Response {
        match outcome {
            ParseOutcome::Accepted(command) => match self.formulator.formulate(&command, &self.context) {
                Ok(call) => Response::Dispatched { command, call },
                Err(err) => {
                    tracing::warn!(rule = %command.rule_id, error = %err, "accepted command could not be formulated");
                    Response::Unserviceable {
                        command,
                        error: err.to_string(),
                    }
                }
            },
            ParseOutcome::NeedsClarification(question) => {
                self.pending = Some(question.clone());
                Response::Question(question)
            }
            ParseOutcome::Rejected(diagnostic) => Response::Fallback(diagnostic),
        }
    }

    /// Replaces the player's context.
    pub fn set_context(&mut self, context: ParseContext) {
        self.pending = None;
        self.demo.world_mut().set_context(context.clone());
        self.context = context;
    }

    /// Starts interacting with a shop, by name or alias.
    ///
    /// Returns `None`, leaving the context alone, if no shop has that name.
    pub fn enter_shop(&mut self, name: &str) -> Option<EntityId> {
        let shop = self.demo.named(EntityKind::Shop, name)?;
        self.set_context(self.context.clone().interacting_with(InteractionTarget::Shop(shop)));
        Some(shop)
    }

    /// Starts talking to an NPC, by name or alias.
    pub fn talk_to(&mut self, name: &str) -> Option<EntityId> {
        let npc = self.demo.named(EntityKind::Npc, name)?;
        self.set_context(self.context.clone().interacting_with(InteractionTarget::Npc(npc)));
        Some(npc)
    }

    /// Stops interacting with any shop or NPC.
    pub fn leave(&mut self) {
        let mut context = self.context.clone();
        context.target = None;
        self.set_context(context);
    }

    fn name(&self, id: EntityId) -> String {
        self.demo.name_of(id).map_or_else(|| id.to_string(), str::to_string)
    }

    fn maybe(&self, id: Option<EntityId>) -> String {
        id.map_or_else(|| "-".to_string(), |id| self.name(id))
    }

    /// Describes the player's situation in one line.
    #[must_use]
    pub fn describe_context(&self) -> String {
        let target = match self.context.target {
            Some(InteractionTarget::Shop(id)) => format!("at {}", self.name(id)),
            Some(InteractionTarget::Npc(id)) => format!("talking to {}", self.name(id)),
            None => "browsing".to_string(),
        };
        let location = self
            .context
            .location
            .map_or_else(|| "nowhere".to_string(), |_| "the market square".to_string());
        format!(
            "{} on {location}, {target}; {} in purse, {} recipes known, {} businesses owned",
            self.id,
            self.context.balance,
            self.context.known_recipes.len(),
            self.context.owned_businesses.len()
        )
    }

    /// Describes a service call using entity names.
    #[must_use]
    pub fn describe_call(&self, call: &ServiceCall) -> String {
        let mut out = format!("{}: ", call.service());
        let _ = match call {
            ServiceCall::Purchase(r) => {
                let price = r.offered_unit_price.map(|p| format!(" at {p} each")).unwrap_or_default();
                write!(out, "buy {} x {} from {}{price}", r.quantity, self.name(r.item), self.maybe(r.shop))
            }
            ServiceCall::Sale(r) => {
                let price = r.asking_unit_price.map(|p| format!(" at {p} each")).unwrap_or_default();
                write!(out, "sell {} x {} to {}{price}", r.quantity, self.name(r.item), self.maybe(r.shop))
            }
            ServiceCall::Craft(r) => write!(out, "craft {} x {}", r.quantity, self.name(r.recipe)),
            ServiceCall::SetPrice(r) => write!(
                out,
                "price {} at {} to {}",
                self.name(r.item),
                self.maybe(r.business),
                r.price
            ),
            ServiceCall::Construct(r) => write!(out, "build {} on {}", self.name(r.building), self.maybe(r.plot)),
            ServiceCall::Inventory(_) => write!(out, "list inventory"),
            ServiceCall::Balance(_) => write!(out, "show balance"),
            ServiceCall::Price(r) => write!(out, "price of {} at {}", self.name(r.item), self.maybe(r.shop)),
            ServiceCall::Market(r) => match r.item {
                Some(item) => write!(out, "market report for {}", self.name(item)),
                None => write!(out, "market report"),
            },
            ServiceCall::Browse(r) => write!(out, "browse {}", self.name(r.shop)),
            ServiceCall::Talk(r) => write!(out, "talk to {}", self.name(r.npc)),
            ServiceCall::Hire(r) => write!(out, "hire {} for {}", self.name(r.worker), self.maybe(r.business)),
            ServiceCall::Recipes(_) => write!(out, "list recipes"),
        };
        out
    }

    /// Renders a response for the terminal.
    #[must_use]
    pub fn render(&self, response: &Response) -> String {
        match response {
            Response::Dispatched { command, call } => {
                let via = if command.clarified { ", clarified" } else { "" };
                format!(
                    "{}  [{} {:.2}{via}]",
                    self.describe_call(call),
                    command.rule_id,
                    command.overall_confidence
                )
            }
            Response::Question(question) => format!("? {}", question.prompt),
            Response::Fallback(diagnostic) => format!("(fallback) {}", diagnostic.reason),
            Response::Unserviceable { command, error } => format!("cannot dispatch {}: {error}", command.intent),
        }
    }

    /// Renders a response as one line of JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if rendering fails.
    pub fn render_json(response: &Response) -> Result<String> {
        serde_json::to_string(response).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("turns", &self.turns)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}
