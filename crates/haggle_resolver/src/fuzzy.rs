//! Surface-form normalization and similarity scoring.
//!
//! Names are compared as word sequences after normalization:
//!
//! 1. Exact key match scores 1.0
//! 2. Containment scores `containment_base + (1 - containment_base) * coverage`,
//!    where coverage is the share of words when one name holds the other on
//!    word boundaries, else the share of characters when the query appears
//!    anywhere inside the name
//! 3. Per-word edit distance scores
//!    `fuzzy_base * (1 - edits / letters) * coverage`
//!
//! The best applicable measure wins.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use haggle_grammar::{Token, normalize};

use crate::config::ResolverConfig;

const DETERMINERS: &[&str] = &["the", "a", "an", "some", "my"];

/// How a surface form matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatchKind {
    /// Per-word edit distance.
    Fuzzy,
    /// One name contains the other.
    Containment,
    /// Same key.
    Exact,
}

/// A scored comparison.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MatchScore {
    /// Which measure produced the score.
    pub kind: MatchKind,
    /// Similarity in `[0, 1]`.
    pub score: f64,
}

/// A normalized name: lowercase singular words without determiners.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceKey(Vec<String>);

impl SurfaceKey {
    /// Normalizes a name or raw slot text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut words = Vec::new();
        for token in normalize(text) {
            match token {
                Token::Word(w) => words.push(w),
                Token::Number(n) => words.push(n.to_string()),
                Token::Currency(c) => words.push(c.word().to_string()),
                Token::Quoted(q) => words.extend(q.split_whitespace().map(str::to_string)),
            }
        }

        let content: Vec<String> = words
            .iter()
            .filter(|w| !DETERMINERS.contains(&w.as_str()))
            .cloned()
            .collect();
        let words = if content.is_empty() { words } else { content };
        Self(words.iter().map(|w| singularize(w)).collect())
    }

    /// The key's words.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.0
    }

    /// Returns true if the key has no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The words joined by spaces.
    #[must_use]
    pub fn text(&self) -> String {
        self.0.join(" ")
    }
}

/// Crude English singular: potions → potion, berries → berry, boxes → box.
#[must_use]
pub fn singularize(word: &str) -> String {
    if word.len() <= 3 || !word.is_ascii() {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }
    for suffix in ["sses", "xes", "ches", "shes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") {
        return word.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

/// Edit distance allowed for a word of `len` characters.
#[must_use]
pub fn allowed_edits(len: usize, max_edit_distance: usize) -> usize {
    match len {
        0..=2 => 0,
        3..=4 => max_edit_distance.min(1),
        _ => max_edit_distance,
    }
}

/// Scores how well `query` names `surface`.
///
/// Returns `None` if no measure applies.
#[must_use]
pub fn score(query: &SurfaceKey, surface: &SurfaceKey, config: &ResolverConfig) -> Option<MatchScore> {
    if query.is_empty() || surface.is_empty() {
        return None;
    }
    if query == surface {
        return Some(MatchScore {
            kind: MatchKind::Exact,
            score: 1.0,
        });
    }

    let containment = containment_coverage(query.words(), surface.words())
        .or_else(|| substring_coverage(&query.text(), &surface.text(), config.min_substring_chars))
        .map(|coverage| MatchScore {
            kind: MatchKind::Containment,
            score: config.containment_base + (1.0 - config.containment_base) * coverage,
        });
    let fuzzy = fuzzy_score(query.words(), surface.words(), config).map(|score| MatchScore {
        kind: MatchKind::Fuzzy,
        score,
    });

    match (containment, fuzzy) {
        (Some(c), Some(f)) => Some(if f.score > c.score { f } else { c }),
        (c, f) => c.or(f),
    }
}

/// Word coverage if one sequence appears contiguously in the other.
fn containment_coverage(a: &[String], b: &[String]) -> Option<f64> {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.len() == long.len() {
        return None;
    }
    long.windows(short.len()).any(|w| w == short).then(|| ratio(short.len(), long.len()))
}

/// Character coverage if `query` appears inside `surface`.
fn substring_coverage(query: &str, surface: &str, min_chars: usize) -> Option<f64> {
    let len = query.chars().count();
    if len < min_chars.max(1) || len >= surface.chars().count() || !surface.contains(query) {
        return None;
    }
    Some(ratio(len, surface.chars().count()))
}

/// Matches each query word, in order, to a surface word within the allowed distance.
fn fuzzy_score(query: &[String], surface: &[String], config: &ResolverConfig) -> Option<f64> {
    if query.len() > surface.len() {
        return None;
    }
    let mut cursor = 0;
    let mut edits = 0;
    let mut letters = 0;
    for word in query {
        let (offset, distance) = surface[cursor..].iter().enumerate().find_map(|(i, candidate)| {
            let allowed = allowed_edits(candidate.chars().count(), config.max_edit_distance);
            let distance = strsim::levenshtein(word, candidate);
            (distance <= allowed).then_some((i, distance))
        })?;
        cursor += offset + 1;
        edits += distance;
        letters += word.chars().count();
    }
    if letters == 0 {
        return None;
    }
    let closeness = 1.0 - ratio(edits, letters);
    Some((config.fuzzy_base * closeness * ratio(query.len(), surface.len())).clamp(0.0, 1.0))
}

#[allow(clippy::cast_precision_loss)]
fn ratio(a: usize, b: usize) -> f64 {
    a as f64 / b as f64
}
