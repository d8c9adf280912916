//! Resolver tuning constants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use haggle_foundation::{Error, Result};

/// Constants controlling fuzzy matching and context priority.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolverConfig {
    /// Minimum score for a non-exact match to count.
    pub fuzzy_threshold: f64,
    /// Largest per-word edit distance for long words.
    pub max_edit_distance: usize,
    /// Score of a containment match with no coverage.
    pub containment_base: f64,
    /// Shortest query that may match inside a word ("iron" in "ironwood").
    pub min_substring_chars: usize,
    /// Score of a fuzzy match with no edits.
    pub fuzzy_base: f64,
    /// How much better a world match may score before it beats a context match.
    pub context_priority_margin: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.6,
            max_edit_distance: 2,
            containment_base: 0.7,
            min_substring_chars: 3,
            fuzzy_base: 0.9,
            context_priority_margin: 0.15,
        }
    }
}

impl ResolverConfig {
    /// Only exact names resolve.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            fuzzy_threshold: 1.0,
            max_edit_distance: 0,
            ..Self::default()
        }
    }

    /// Accepts looser matches and typos.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            fuzzy_threshold: 0.5,
            context_priority_margin: 0.25,
            ..Self::default()
        }
    }

    /// Builder method to set the fuzzy threshold.
    #[must_use]
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Builder method to set the maximum edit distance.
    #[must_use]
    pub fn with_max_edit_distance(mut self, distance: usize) -> Self {
        self.max_edit_distance = distance;
        self
    }

    /// Builder method to set the context priority margin.
    #[must_use]
    pub fn with_context_priority_margin(mut self, margin: f64) -> Self {
        self.context_priority_margin = margin;
        self
    }

    /// Checks every constant is in range.
    ///
    /// # Errors
    ///
    /// Returns an invalid configuration error naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        unit("resolver.fuzzy_threshold", self.fuzzy_threshold)?;
        unit("resolver.containment_base", self.containment_base)?;
        unit("resolver.fuzzy_base", self.fuzzy_base)?;
        unit("resolver.context_priority_margin", self.context_priority_margin)?;
        if self.fuzzy_threshold <= 0.0 {
            return Err(Error::invalid_config(
                "resolver.fuzzy_threshold",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn unit(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(field, format!("{value} is outside [0, 1]")))
    }
}
