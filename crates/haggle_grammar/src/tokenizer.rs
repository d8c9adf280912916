//! Input normalization.
//!
//! Converts raw player input into a stream of tokens.

use std::fmt;

use haggle_foundation::Currency;

/// A token from player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A lowercase word
    Word(String),
    /// A numeric quantity
    Number(u64),
    /// A currency word or suffix directly following a number
    Currency(Currency),
    /// A quoted string (lowercased, kept as one unit)
    Quoted(String),
}

impl Token {
    /// Returns the word if this is a plain word token.
    #[must_use]
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(w) => Some(w),
            _ => None,
        }
    }

    /// Returns the numeric value of a number token or a number word.
    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Word(w) => number_word(w),
            _ => None,
        }
    }

    /// Returns true for tokens that can name something (words and quoted strings).
    #[must_use]
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Word(_) | Self::Quoted(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word(w) | Self::Quoted(w) => f.write_str(w),
            Self::Number(n) => write!(f, "{n}"),
            Self::Currency(c) => write!(f, "{c}"),
        }
    }
}

/// Normalizes player input.
pub struct Normalizer;

impl Normalizer {
    /// Normalizes a raw input string into tokens.
    ///
    /// - Converts words to lowercase
    /// - Strips punctuation; apostrophes are dropped inside words ("what's" -> "whats")
    /// - Keeps double-quoted runs as single [`Token::Quoted`] units
    /// - Splits quantities from currency suffixes ("20g" -> `20`, `gold`)
    ///
    /// Empty or whitespace-only input yields an empty vector.
    #[must_use]
    pub fn normalize(input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut chars = input.chars().peekable();
        let mut current_word = String::new();

        while let Some(ch) = chars.next() {
            match ch {
                '"' => {
                    Self::flush(&mut current_word, &mut tokens);
                    let mut quoted = String::new();
                    for c in chars.by_ref() {
                        if c == '"' {
                            break;
                        }
                        quoted.push(c);
                    }
                    let quoted = collapse_whitespace(&quoted.to_lowercase());
                    if !quoted.is_empty() {
                        tokens.push(Token::Quoted(quoted));
                    }
                }
                '\'' | '\u{2019}' => {
                    // Contractions and possessives: "what's" -> "whats"
                }
                c if c.is_alphanumeric() || c == '-' => {
                    current_word.extend(c.to_lowercase());
                }
                _ => {
                    Self::flush(&mut current_word, &mut tokens);
                }
            }
        }

        Self::flush(&mut current_word, &mut tokens);
        tokens
    }

    /// Pushes the pending word (if any) as one or more tokens.
    fn flush(word: &mut String, tokens: &mut Vec<Token>) {
        if word.is_empty() {
            return;
        }
        let raw = std::mem::take(word);
        let trimmed = raw.trim_matches('-');
        if trimmed.is_empty() {
            return;
        }

        let after_number = matches!(tokens.last(), Some(Token::Number(_)));
        if after_number {
            if let Some(currency) = Currency::from_suffix(trimmed) {
                tokens.push(Token::Currency(currency));
                return;
            }
        }

        let digits_end = trimmed
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(trimmed.len(), |(i, _)| i);

        if digits_end == 0 {
            tokens.push(Token::Word(trimmed.to_string()));
            return;
        }

        let Ok(number) = trimmed[..digits_end].parse::<u64>() else {
            tokens.push(Token::Word(trimmed.to_string()));
            return;
        };

        let suffix = &trimmed[digits_end..];
        if suffix.is_empty() || suffix == "x" {
            tokens.push(Token::Number(number));
        } else if let Some(currency) = Currency::from_suffix(suffix) {
            tokens.push(Token::Number(number));
            tokens.push(Token::Currency(currency));
        } else {
            tokens.push(Token::Word(trimmed.to_string()));
        }
    }
}

/// Convenience wrapper for [`Normalizer::normalize`].
#[must_use]
pub fn normalize(input: &str) -> Vec<Token> {
    Normalizer::normalize(input)
}

/// Joins tokens back into a single space-separated string.
#[must_use]
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a spelled-out quantity ("one" .. "twenty", "dozen").
#[must_use]
pub fn number_word(word: &str) -> Option<u64> {
    let n = match word {
        "one" => 1,
        "two" | "couple" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" | "dozen" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        "twenty" => 20,
        _ => return None,
    };
    Some(n)
}

/// A position in a list of options chosen by the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ordinal {
    /// 1-based position.
    Nth(usize),
    /// The last option.
    Last,
}

impl Ordinal {
    /// Converts to a 0-based index into a list of `len` options.
    #[must_use]
    pub fn index(self, len: usize) -> Option<usize> {
        match self {
            Self::Nth(n) if n >= 1 && n <= len => Some(n - 1),
            Self::Last if len > 0 => Some(len - 1),
            _ => None,
        }
    }
}

/// Parses an ordinal word ("first", "2nd", "last").
#[must_use]
pub fn ordinal_word(word: &str) -> Option<Ordinal> {
    let n = match word {
        "first" | "1st" => 1,
        "second" | "2nd" => 2,
        "third" | "3rd" => 3,
        "fourth" | "4th" => 4,
        "fifth" | "5th" => 5,
        "sixth" | "6th" => 6,
        "seventh" | "7th" => 7,
        "eighth" | "8th" => 8,
        "ninth" | "9th" => 9,
        "tenth" | "10th" => 10,
        "last" => return Some(Ordinal::Last),
        _ => return None,
    };
    Some(Ordinal::Nth(n))
}
