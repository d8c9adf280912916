//! Rule patterns.
//!
//! A pattern is a whitespace-separated sequence of elements:
//!
//! | Syntax            | Element                                          |
//! |-------------------|--------------------------------------------------|
//! | `<verb>`          | any verb registered for the rule's own intent    |
//! | `<sell-item>`     | any verb registered for the named intent         |
//! | `from\|at`        | a fixed word, with alternatives                  |
//! | `?item:item`      | a slot named `item` of kind `item`               |
//! | `[ ... ]`         | an optional segment (may nest)                   |
//!
//! Slots inside an optional segment are optional slots.

use std::fmt;
use std::str::FromStr;

use haggle_foundation::{EntityKind, Error, ErrorKind, Intent, Result};

/// How a slot's text is taken from the input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    /// A run of tokens up to the next anchor word.
    Span,
    /// A single number token or number word.
    Number,
    /// An amount with an optional currency and an optional "coins"/"pieces".
    Money,
}

impl ExtractionStrategy {
    /// The strategy used for slots of the given kind.
    #[must_use]
    pub const fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Number => Self::Number,
            EntityKind::Currency => Self::Money,
            _ => Self::Span,
        }
    }
}

/// A slot declared in a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotSpec {
    /// Slot name, unique within a rule.
    pub name: String,
    /// What the slot refers to.
    pub kind: EntityKind,
    /// How its text is extracted.
    pub strategy: ExtractionStrategy,
    /// True if the slot sits inside an optional segment.
    pub optional: bool,
}

impl fmt::Display for SlotSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}:{}", self.name, self.kind)
    }
}

/// One element of a compiled pattern.
#[derive(Clone, Debug, PartialEq)]
pub enum PatternElement {
    /// Any registered verb of an intent.
    Verb(Intent),
    /// A fixed word; any alternative matches.
    Literal(Vec<String>),
    /// A slot to extract.
    Slot(SlotSpec),
    /// A segment that may be absent.
    Optional(Vec<PatternElement>),
}

impl PatternElement {
    /// Returns true if this is a span slot.
    #[must_use]
    pub fn is_span(&self) -> bool {
        matches!(self, Self::Slot(s) if s.strategy == ExtractionStrategy::Span)
    }
}

impl fmt::Display for PatternElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verb(intent) => write!(f, "<{intent}>"),
            Self::Literal(words) => f.write_str(&words.join("|")),
            Self::Slot(slot) => write!(f, "{slot}"),
            Self::Optional(inner) => {
                f.write_str("[")?;
                for (i, e) in inner.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{e}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Compiles pattern text into elements.
pub struct PatternCompiler<'a> {
    rule: &'a str,
    intent: Intent,
}

impl<'a> PatternCompiler<'a> {
    /// Creates a compiler for the pattern of `rule`, whose `<verb>` means `intent`.
    #[must_use]
    pub fn new(rule: &'a str, intent: Intent) -> Self {
        Self { rule, intent }
    }

    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error for empty patterns or segments, unbalanced brackets,
    /// malformed slots, unknown kinds or intents, and duplicate slot names.
    pub fn compile(&self, source: &str) -> Result<Vec<PatternElement>> {
        let pieces = split_pattern(source);
        let mut pos = 0;
        let elements = self.parse_sequence(&pieces, &mut pos, false)?;
        if pos < pieces.len() {
            return Err(self.error("unbalanced `]`"));
        }
        if elements.is_empty() {
            return Err(self.error("empty pattern"));
        }

        let mut seen = Vec::new();
        for slot in slots_of(&elements) {
            if seen.contains(&slot.name.as_str()) {
                return Err(self.error(format!("duplicate slot name `{}`", slot.name)));
            }
            seen.push(slot.name.as_str());
        }

        Ok(elements)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::invalid_pattern(self.rule, message)
    }

    fn parse_sequence(
        &self,
        pieces: &[&str],
        pos: &mut usize,
        in_optional: bool,
    ) -> Result<Vec<PatternElement>> {
        let mut elements = Vec::new();
        while let Some(piece) = pieces.get(*pos) {
            *pos += 1;
            match *piece {
                "[" => {
                    let inner = self.parse_sequence(pieces, pos, true)?;
                    if inner.is_empty() {
                        return Err(self.error("empty optional segment"));
                    }
                    elements.push(PatternElement::Optional(inner));
                }
                "]" => {
                    if in_optional {
                        return Ok(elements);
                    }
                    *pos -= 1;
                    return Ok(elements);
                }
                text => elements.push(self.parse_element(text, in_optional)?),
            }
        }
        if in_optional {
            return Err(self.error("unbalanced `[`"));
        }
        Ok(elements)
    }

    fn parse_element(&self, text: &str, optional: bool) -> Result<PatternElement> {
        if let Some(inner) = text.strip_prefix('<') {
            let Some(name) = inner.strip_suffix('>') else {
                return Err(self.error(format!("malformed verb class `{text}`")));
            };
            if name == "verb" {
                return Ok(PatternElement::Verb(self.intent));
            }
            let intent = Intent::from_str(name)
                .map_err(|name| Error::new(ErrorKind::UnknownIntent(name)))?;
            return Ok(PatternElement::Verb(intent));
        }

        if let Some(body) = text.strip_prefix('?') {
            let Some((name, kind)) = body.split_once(':') else {
                return Err(self.error(format!("slot `{text}` needs a kind (?name:kind)")));
            };
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                return Err(self.error(format!("malformed slot name in `{text}`")));
            }
            let kind = EntityKind::from_str(kind)
                .map_err(|kind| Error::new(ErrorKind::UnknownSlotKind(kind)))?;
            return Ok(PatternElement::Slot(SlotSpec {
                name: name.to_string(),
                kind,
                strategy: ExtractionStrategy::for_kind(kind),
                optional,
            }));
        }

        let alternatives: Vec<String> = text.split('|').map(str::to_lowercase).collect();
        if alternatives
            .iter()
            .any(|a| a.is_empty() || !a.chars().all(|c| c.is_alphanumeric() || c == '-'))
        {
            return Err(self.error(format!("malformed word `{text}`")));
        }
        Ok(PatternElement::Literal(alternatives))
    }
}

fn split_pattern(source: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = None;
    for (i, c) in source.char_indices() {
        match c {
            '[' | ']' => {
                if let Some(s) = start.take() {
                    pieces.push(&source[s..i]);
                }
                pieces.push(&source[i..i + 1]);
            }
            c if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    pieces.push(&source[s..i]);
                }
            }
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
    }
    if let Some(s) = start {
        pieces.push(&source[s..]);
    }
    pieces
}

/// All slots of a pattern, in order of appearance.
#[must_use]
pub fn slots_of(elements: &[PatternElement]) -> Vec<&SlotSpec> {
    let mut out = Vec::new();
    collect_slots(elements, &mut out);
    out
}

fn collect_slots<'a>(elements: &'a [PatternElement], out: &mut Vec<&'a SlotSpec>) {
    for element in elements {
        match element {
            PatternElement::Slot(s) => out.push(s),
            PatternElement::Optional(inner) => collect_slots(inner, out),
            PatternElement::Verb(_) | PatternElement::Literal(_) => {}
        }
    }
}

/// Counts (mandatory, total) leaf elements.
#[must_use]
pub fn leaf_counts(elements: &[PatternElement]) -> (usize, usize) {
    fn walk(elements: &[PatternElement], optional: bool, counts: &mut (usize, usize)) {
        for element in elements {
            if let PatternElement::Optional(inner) = element {
                walk(inner, true, counts);
            } else {
                if !optional {
                    counts.0 += 1;
                }
                counts.1 += 1;
            }
        }
    }
    let mut counts = (0, 0);
    walk(elements, false, &mut counts);
    counts
}

/// Leaf elements that can come first in the concatenation of `parts`.
///
/// The flag is true if every part can be empty.
#[must_use]
pub fn first_leaves<'a>(parts: &[&'a [PatternElement]]) -> (Vec<&'a PatternElement>, bool) {
    let mut leaves = Vec::new();
    for part in parts {
        if !first_of_sequence(part, &mut leaves) {
            return (leaves, false);
        }
    }
    (leaves, true)
}

fn first_of_sequence<'a>(sequence: &'a [PatternElement], leaves: &mut Vec<&'a PatternElement>) -> bool {
    for element in sequence {
        if let PatternElement::Optional(inner) = element {
            first_of_sequence(inner, leaves);
        } else {
            leaves.push(element);
            return false;
        }
    }
    true
}

/// Finds a span slot that can be directly followed by another span slot.
///
/// Such a pair has no anchor word between them, so the boundary is undecidable.
#[must_use]
pub fn adjacent_spans(elements: &[PatternElement]) -> Option<(String, String)> {
    fn walk(elements: &[PatternElement], outer: &[&[PatternElement]]) -> Option<(String, String)> {
        for (i, element) in elements.iter().enumerate() {
            let mut parts = vec![&elements[i + 1..]];
            parts.extend_from_slice(outer);
            match element {
                PatternElement::Slot(slot) if element.is_span() => {
                    let (leaves, _) = first_leaves(&parts);
                    for leaf in leaves {
                        if let PatternElement::Slot(next) = leaf {
                            if leaf.is_span() {
                                return Some((slot.name.clone(), next.name.clone()));
                            }
                        }
                    }
                }
                PatternElement::Optional(inner) => {
                    if let Some(pair) = walk(inner, &parts) {
                        return Some(pair);
                    }
                }
                _ => {}
            }
        }
        None
    }
    walk(elements, &[])
}
