//! Reader for the grammar DSL.
//!
//! The grammar is written as s-expressions:
//!
//! ```text
//! ;; comment
//! (intent: buy-item :verbs [buy purchase "pick up"])
//! (rule: buy-item/bare :intent buy-item :confidence 0.92 :pattern "<verb> ?item:item")
//! ```
//!
//! The reader only produces [`Datum`] trees; the compiler gives them meaning.

use haggle_foundation::{Error, Result};

/// A source position (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    /// Line number.
    pub line: u32,
    /// Column number.
    pub column: u32,
}

/// A datum read from the DSL.
#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    /// A bare symbol: `buy-item`, `rule:`
    Symbol(String, Position),
    /// A keyword: `:intent`
    Keyword(String, Position),
    /// A string literal
    Str(String, Position),
    /// A number
    Number(f64, Position),
    /// A parenthesized list
    List(Vec<Datum>, Position),
    /// A bracketed vector
    Vector(Vec<Datum>, Position),
}

impl Datum {
    /// Where this datum starts.
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Self::Symbol(_, p)
            | Self::Keyword(_, p)
            | Self::Str(_, p)
            | Self::Number(_, p)
            | Self::List(_, p)
            | Self::Vector(_, p) => *p,
        }
    }

    /// Returns the text of a symbol or string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Symbol(s, _) | Self::Str(s, _) => Some(s),
            _ => None,
        }
    }

    /// Short description for error messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Symbol(..) => "symbol",
            Self::Keyword(..) => "keyword",
            Self::Str(..) => "string",
            Self::Number(..) => "number",
            Self::List(..) => "list",
            Self::Vector(..) => "vector",
        }
    }
}

/// Reads DSL source into data.
pub struct Reader<'src> {
    rest: &'src str,
    line: u32,
    column: u32,
}

impl<'src> Reader<'src> {
    /// Creates a reader for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            rest: source,
            line: 1,
            column: 1,
        }
    }

    /// Reads every top-level datum in the source.
    ///
    /// # Errors
    ///
    /// Returns a DSL syntax error with the line and column of the problem.
    pub fn read_all(source: &str) -> Result<Vec<Datum>> {
        let mut reader = Reader::new(source);
        let mut data = Vec::new();
        loop {
            reader.skip_trivia();
            if reader.rest.is_empty() {
                return Ok(data);
            }
            data.push(reader.read_datum()?);
        }
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::dsl_syntax(message, self.line, self.column)
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.rest = &self.rest[c.len_utf8()..];
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skips whitespace, commas and `;` comments.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == ',' {
                self.advance();
            } else if c == ';' {
                while let Some(c) = self.peek_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_datum(&mut self) -> Result<Datum> {
        self.skip_trivia();
        let start = self.position();
        let Some(c) = self.peek_char() else {
            return Err(self.error("unexpected end of input"));
        };

        match c {
            '(' => {
                self.advance();
                let items = self.read_sequence(')')?;
                Ok(Datum::List(items, start))
            }
            '[' => {
                self.advance();
                let items = self.read_sequence(']')?;
                Ok(Datum::Vector(items, start))
            }
            ')' | ']' => Err(self.error(format!("unexpected `{c}`"))),
            '"' => self.read_string(start),
            ':' => {
                self.advance();
                let name = self.read_atom_text();
                if name.is_empty() {
                    return Err(Error::dsl_syntax("empty keyword", start.line, start.column));
                }
                Ok(Datum::Keyword(name, start))
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let text = self.read_atom_text();
                match text.parse::<f64>() {
                    Ok(n) => Ok(Datum::Number(n, start)),
                    Err(_) => Ok(Datum::Symbol(text, start)),
                }
            }
            c if is_atom_char(c) => Ok(Datum::Symbol(self.read_atom_text(), start)),
            c => Err(self.error(format!("unexpected character: {c}"))),
        }
    }

    fn read_sequence(&mut self, close: char) -> Result<Vec<Datum>> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek_char() {
                None => return Err(self.error(format!("unclosed delimiter, expected `{close}`"))),
                Some(c) if c == close => {
                    self.advance();
                    return Ok(items);
                }
                Some(_) => items.push(self.read_datum()?),
            }
        }
    }

    fn read_string(&mut self, start: Position) -> Result<Datum> {
        self.advance();
        let mut text = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(Error::dsl_syntax(
                        "unterminated string",
                        start.line,
                        start.column,
                    ));
                }
                Some('"') => return Ok(Datum::Str(text, start)),
                Some('\\') => match self.advance() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(c @ ('"' | '\\')) => text.push(c),
                    Some(c) => return Err(self.error(format!("unknown escape: \\{c}"))),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => text.push(c),
            }
        }
    }

    fn read_atom_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if is_atom_char(c) {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        text
    }
}

fn is_atom_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '/' | '?' | '!' | '<' | '>' | '*' | '+' | '.' | '=' | ':' | '|')
}
