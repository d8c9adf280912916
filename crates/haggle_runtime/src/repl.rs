//! The interactive REPL and the batch runner.
//!
//! Lines starting with `:` are meta-commands; everything else is player
//! input handed to the [`Session`].

use std::io::{BufRead, Write};

use haggle_foundation::{EntityId, Error, Intent, Result};
use haggle_stdlib::CANONICAL;

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::session::{Response, Session};

const META_COMMANDS: &[&str] = &[
    ":help", ":quit", ":context", ":shop", ":npc", ":leave", ":skip", ":report", ":log", ":export", ":json",
    ":examples",
];

const HELP: &str = "\
Type a command as a player would, e.g. \"buy 2 health potions from the Tipsy Pixie\".
When the engine asks a question, the next line is taken as the answer.

Meta-commands:
  :help            show this help
  :quit            leave the REPL
  :context         describe where the player is
  :shop NAME       start trading with a shop
  :npc NAME        start talking to an NPC
  :leave           stop interacting with anyone
  :skip            drop the outstanding question
  :report          grammar coverage report
  :log [N]         the last N coverage records (default 10)
  :export PATH     write the coverage log as MessagePack
  :json            toggle JSON output
  :examples        one example per intent";

/// What one evaluated line asks the loop to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Print this and read the next line.
    Print(String),
    /// Read the next line.
    Nothing,
    /// Leave the loop.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Engine, world and player state.
    session: Session,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Prompt shown while a question is outstanding.
    answer_prompt: String,

    /// Print responses as JSON.
    json: bool,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(session: Session) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, session))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(mut editor: E, session: Session) -> Self {
        editor.set_keywords(keywords(&session));
        Self {
            editor,
            session,
            show_banner: true,
            prompt: "haggle> ".to_string(),
            answer_prompt: "  ...> ".to_string(),
            json: false,
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets JSON output.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails. Errors from meta-commands
    /// are printed and the loop continues.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        while self.read_eval_print()? {}

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let prompt = if self.session.pending().is_some() {
            self.answer_prompt.clone()
        } else {
            self.prompt.clone()
        };

        let input = match self.editor.read_line(&prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                if self.session.abandon_question() {
                    println!("(question dropped)");
                }
                return Ok(true);
            }
            ReadResult::Eof => return Ok(false),
        };

        if input.trim().is_empty() {
            return Ok(true);
        }
        self.editor.add_history(&input);

        match self.eval(&input) {
            Ok(Step::Print(text)) => println!("{text}"),
            Ok(Step::Nothing) => {}
            Ok(Step::Quit) => return Ok(false),
            Err(e) => Self::print_error(&e),
        }
        Ok(true)
    }

    /// Evaluates one line.
    ///
    /// # Errors
    ///
    /// Returns an error if a meta-command fails, such as an export that
    /// cannot be written. Player input never errors.
    pub fn eval(&mut self, input: &str) -> Result<Step> {
        let line = input.trim();
        if line.is_empty() {
            return Ok(Step::Nothing);
        }
        if line.starts_with(':') {
            return self.eval_meta(line);
        }

        let response = self.session.submit(line);
        let text = if self.json {
            Session::render_json(&response)?
        } else {
            self.session.render(&response)
        };
        if let Response::Fallback(diagnostic) = &response {
            tracing::debug!(input = %diagnostic.raw_input, "handing input to the fallback interpreter");
        }
        Ok(Step::Print(text))
    }

    fn eval_meta(&mut self, line: &str) -> Result<Step> {
        let (command, arg) = line.split_once(char::is_whitespace).map_or((line, ""), |(c, a)| (c, a.trim()));

        let text = match command {
            ":help" | ":h" | ":?" => HELP.to_string(),
            ":quit" | ":q" | ":exit" => return Ok(Step::Quit),
            ":context" => self.session.describe_context(),
            ":shop" if arg.is_empty() => "usage: :shop NAME".to_string(),
            ":shop" => match self.session.enter_shop(arg) {
                Some(id) => format!("now trading with {}", self.display(id)),
                None => format!("no shop called '{arg}'"),
            },
            ":npc" if arg.is_empty() => "usage: :npc NAME".to_string(),
            ":npc" => match self.session.talk_to(arg) {
                Some(id) => format!("now talking to {}", self.display(id)),
                None => format!("nobody called '{arg}'"),
            },
            ":leave" => {
                self.session.leave();
                "you step back into the square".to_string()
            }
            ":skip" => {
                if self.session.abandon_question() {
                    "question dropped".to_string()
                } else {
                    "no question outstanding".to_string()
                }
            }
            ":report" => self.session.coverage().report().to_string(),
            ":log" => match log_count(arg) {
                Some(count) => {
                    let coverage = self.session.coverage();
                    let records = coverage.recent(count);
                    if records.is_empty() {
                        "(coverage log is empty)".to_string()
                    } else {
                        coverage.format_records(&records)
                    }
                }
                None => "usage: :log [N]".to_string(),
            },
            ":export" if arg.is_empty() => "usage: :export PATH".to_string(),
            ":export" => {
                let coverage = self.session.coverage();
                coverage.export_to_file(arg)?;
                format!("wrote {} records to {arg}", coverage.len())
            }
            ":json" => {
                self.json = !self.json;
                format!("json output {}", if self.json { "on" } else { "off" })
            }
            ":examples" => examples(),
            _ => format!("unknown command {command}; try :help"),
        };
        Ok(Step::Print(text))
    }

    fn display(&self, id: EntityId) -> String {
        self.session
            .demo()
            .name_of(id)
            .map_or_else(|| id.to_string(), str::to_string)
    }

    /// Runs a script: one input or meta-command per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. Each input is
    /// echoed after the prompt, followed by its output.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the script or writing the output fails.
    pub fn run_script<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<usize> {
        let mut evaluated = 0;
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let prompt = if self.session.pending().is_some() {
                &self.answer_prompt
            } else {
                &self.prompt
            };
            writeln!(out, "{prompt}{trimmed}")?;
            evaluated += 1;

            match self.eval(trimmed) {
                Ok(Step::Print(text)) => writeln!(out, "{text}")?,
                Ok(Step::Nothing) => {}
                Ok(Step::Quit) => break,
                Err(e) => writeln!(out, "error: {e}")?,
            }
        }
        Ok(evaluated)
    }

    fn print_error(error: &Error) {
        match &error.context {
            Some(context) => eprintln!("\x1b[31merror\x1b[0m: {error} ({context})"),
            None => eprintln!("\x1b[31merror\x1b[0m: {error}"),
        }
    }

    fn print_banner(&self) {
        println!("haggle {}", env!("CARGO_PKG_VERSION"));
        println!("{}", self.session.describe_context());
        println!("Type :help for meta-commands, :examples for things to try.\n");
    }
}

fn log_count(arg: &str) -> Option<usize> {
    if arg.is_empty() {
        Some(10)
    } else {
        arg.parse().ok()
    }
}

fn examples() -> String {
    CANONICAL
        .iter()
        .map(|e| format!("  {:<24} {}", e.intent.name(), e.input))
        .collect::<Vec<_>>()
        .join("\n")
}

fn keywords(session: &Session) -> Vec<String> {
    let mut words: Vec<String> = META_COMMANDS.iter().map(|c| (*c).to_string()).collect();
    let verbs = &session.engine().grammar().verbs;
    for intent in Intent::ALL {
        words.extend(verbs.verbs_for(intent));
    }
    words.sort();
    words.dedup();
    words
}
