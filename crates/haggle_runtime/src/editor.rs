//! Line editor abstraction for the REPL.
//!
//! The REPL talks to a [`LineEditor`]; [`RustylineEditor`] is the terminal
//! implementation and tests substitute a scripted one.

use std::borrow::Cow;

use haggle_foundation::{Error, ErrorKind, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator};

/// What the player did at the prompt.
#[derive(Debug)]
pub enum ReadResult {
    /// Typed a line.
    Line(String),
    /// Ctrl+C; drops an outstanding question.
    Interrupted,
    /// Ctrl+D or end of input.
    Eof,
}

/// Where the REPL gets its lines from.
pub trait LineEditor {
    /// Prompts and waits for one line.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Remembers a submitted line.
    fn add_history(&mut self, line: &str);

    /// Set the phrases offered for completion.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

#[derive(Helper, Completer, Hinter, Validator)]
struct HaggleHelper {
    #[rustyline(Completer)]
    completer: PhraseCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

impl Highlighter for HaggleHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        highlight_line(line)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, default: bool) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Colors meta-commands cyan and numbers magenta.
fn highlight_line(line: &str) -> Cow<'_, str> {
    if line.trim_start().starts_with(':') {
        return Cow::Owned(format!("\x1b[36m{line}\x1b[0m"));
    }
    if !line.chars().any(|c| c.is_ascii_digit()) {
        return Cow::Borrowed(line);
    }

    let mut result = String::with_capacity(line.len() * 2);
    let mut in_number = false;
    for c in line.chars() {
        let digit = c.is_ascii_digit();
        if digit && !in_number {
            result.push_str("\x1b[35m");
        } else if !digit && in_number {
            result.push_str("\x1b[0m");
        }
        in_number = digit;
        result.push(c);
    }
    if in_number {
        result.push_str("\x1b[0m");
    }
    Cow::Owned(result)
}

/// Completes meta-commands and command verbs from the start of the line.
#[derive(Default)]
struct PhraseCompleter {
    keywords: Vec<String>,
}

impl Completer for PhraseCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = line[..pos].to_lowercase();
        let candidates = self
            .keywords
            .iter()
            .filter(|kw| kw.starts_with(&typed))
            .map(|kw| Pair {
                display: kw.clone(),
                replacement: kw.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

/// Terminal editor with history hints and phrase completion.
pub struct RustylineEditor {
    editor: Editor<HaggleHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Opens the terminal editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be configured.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?
            .build();

        let helper = HaggleHelper {
            completer: PhraseCompleter::default(),
            hinter: HistoryHinter::new(),
        };

        let mut editor = Editor::with_config(config).map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::Io(e.to_string()))),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.keywords = keywords;
        }
    }
}
