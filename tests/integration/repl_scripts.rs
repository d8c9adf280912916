//! The REPL driven by scripts and a scripted line editor.

use std::collections::VecDeque;

use haggle_foundation::Result;
use haggle_runtime::{LineEditor, ReadResult, Repl, RuntimeConfig, Session, Step};

/// Replays canned keystrokes, then reports end of input.
struct Keystrokes {
    lines: VecDeque<ReadResult>,
    prompts: Vec<String>,
}

impl Keystrokes {
    fn new(lines: Vec<ReadResult>) -> Self {
        Self {
            lines: lines.into(),
            prompts: Vec::new(),
        }
    }
}

impl LineEditor for Keystrokes {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front().unwrap_or(ReadResult::Eof))
    }

    fn add_history(&mut self, _line: &str) {}

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

fn line(text: &str) -> ReadResult {
    ReadResult::Line(text.to_string())
}

fn repl(lines: Vec<ReadResult>) -> Repl<Keystrokes> {
    let session = Session::new(&RuntimeConfig::default()).unwrap();
    Repl::with_editor(Keystrokes::new(lines), session).without_banner()
}

fn run_script(script: &str) -> String {
    let mut repl = repl(Vec::new());
    let mut out = Vec::new();
    repl.run_script(script.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn interrupt_drops_the_question() {
    let mut repl = repl(vec![line("sell potion"), ReadResult::Interrupted, line("mana")]);
    repl.run().unwrap();

    // "mana" was parsed as a fresh command, not as an answer.
    let report = repl.session().coverage().report();
    assert_eq!(report.clarifications, 1);
    assert_eq!(report.accepted_after_clarification, 0);
    assert_eq!(repl.session().turns(), 2);
}

#[test]
fn script_walks_between_shops() {
    let out = run_script(
        "\
# start at the pixie, then visit the smithy
:shop smithy
buy a steel ingot
:leave
browse
the pixie
:context
",
    );

    assert!(out.contains("now trading with Grumbold's Smithy"), "{out}");
    assert!(out.contains("trade: buy 1 x Steel Ingot from Grumbold's Smithy"), "{out}");
    assert!(out.contains("? Which shop do you want to browse?"), "{out}");
    assert!(out.contains("  ...> the pixie\nmarket: browse The Tipsy Pixie"), "{out}");
    assert!(out.contains("player-1 on the market square, browsing"), "{out}");
}

#[test]
fn skip_meta_command() {
    let out = run_script("sell potion\n:skip\n:skip\n");
    assert!(out.contains("question dropped"));
    assert!(out.contains("no question outstanding"));
}

#[test]
fn quit_stops_the_script() {
    let mut repl = repl(Vec::new());
    let mut out = Vec::new();
    let evaluated = repl
        .run_script("check my balance\n:quit\ncheck my inventory\n".as_bytes(), &mut out)
        .unwrap();
    assert_eq!(evaluated, 2);
    assert_eq!(repl.session().turns(), 1);
}

#[test]
fn json_mode_prints_tagged_responses() {
    let mut repl = repl(Vec::new()).with_json(true);

    match repl.eval("what's the weather like").unwrap() {
        Step::Print(text) => assert!(text.contains(r#""reason":"NoMatchingRule""#), "{text}"),
        other => panic!("expected output, got {other:?}"),
    }
    match repl.eval("sell potion").unwrap() {
        Step::Print(text) => assert!(text.starts_with(r#"{"type":"question""#), "{text}"),
        other => panic!("expected output, got {other:?}"),
    }
}
