//! Engine configuration.
//!
//! Every threshold and weighting constant lives here so it can be tuned
//! against a labeled command corpus instead of being assumed correct.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use haggle_foundation::{Error, Result};
use haggle_grammar::DEFAULT_MISSING_EXPECTED_PENALTY;
use haggle_resolver::ResolverConfig;

/// Thresholds of the confidence policy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PolicyConfig {
    /// Overall confidence at or above which a command is dispatched.
    pub accept_threshold: f64,
    /// Overall confidence at or above which the player is asked to clarify.
    pub clarify_threshold: f64,
    /// Most options offered in one clarification question.
    pub max_clarify_options: usize,
    /// Competing intents closer than this to the winner are offered as options.
    pub intent_margin: f64,
    /// Grammar confidence lost per absent expected slot.
    pub missing_expected_penalty: f64,
    /// Longest input, in tokens, that is matched at all.
    pub max_input_tokens: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.85,
            clarify_threshold: 0.5,
            max_clarify_options: 3,
            intent_margin: 0.05,
            missing_expected_penalty: DEFAULT_MISSING_EXPECTED_PENALTY,
            max_input_tokens: 64,
        }
    }
}

/// Limits on suspended clarifications.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClarificationConfig {
    /// How long a question stays answerable, in milliseconds.
    pub ttl_ms: u64,
    /// Most pending questions across all sessions.
    pub max_pending: usize,
}

impl Default for ClarificationConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 120_000,
            max_pending: 1024,
        }
    }
}

impl ClarificationConfig {
    /// The time-to-live as a duration.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Confidence policy thresholds.
    pub policy: PolicyConfig,
    /// Fuzzy matching constants.
    pub resolver: ResolverConfig,
    /// Clarification store limits.
    pub clarification: ClarificationConfig,
}

impl EngineConfig {
    /// Dispatches only near-certain commands and resolves exact names only.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            policy: PolicyConfig {
                accept_threshold: 0.95,
                clarify_threshold: 0.7,
                ..PolicyConfig::default()
            },
            resolver: ResolverConfig::strict(),
            clarification: ClarificationConfig::default(),
        }
    }

    /// Dispatches more readily and tolerates typos.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            policy: PolicyConfig {
                accept_threshold: 0.75,
                clarify_threshold: 0.4,
                intent_margin: 0.1,
                ..PolicyConfig::default()
            },
            resolver: ResolverConfig::lenient(),
            clarification: ClarificationConfig::default(),
        }
    }

    /// Builder method to set the accept threshold.
    #[must_use]
    pub fn with_accept_threshold(mut self, threshold: f64) -> Self {
        self.policy.accept_threshold = threshold;
        self
    }

    /// Builder method to set the clarify threshold.
    #[must_use]
    pub fn with_clarify_threshold(mut self, threshold: f64) -> Self {
        self.policy.clarify_threshold = threshold;
        self
    }

    /// Builder method to set the most options per question.
    #[must_use]
    pub fn with_max_clarify_options(mut self, options: usize) -> Self {
        self.policy.max_clarify_options = options;
        self
    }

    /// Builder method to set the missing expected slot penalty.
    #[must_use]
    pub fn with_missing_expected_penalty(mut self, penalty: f64) -> Self {
        self.policy.missing_expected_penalty = penalty;
        self
    }

    /// Builder method to set the longest matched input.
    #[must_use]
    pub fn with_max_input_tokens(mut self, tokens: usize) -> Self {
        self.policy.max_input_tokens = tokens;
        self
    }

    /// Builder method to set the resolver constants.
    #[must_use]
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Builder method to set the clarification time-to-live.
    #[must_use]
    pub fn with_clarification_ttl(mut self, ttl: Duration) -> Self {
        self.clarification.ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Builder method to set the pending clarification cap.
    #[must_use]
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.clarification.max_pending = max_pending;
        self
    }

    /// Checks every constant is in range and the thresholds are ordered.
    ///
    /// # Errors
    ///
    /// Returns an invalid configuration error naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let p = &self.policy;
        unit("policy.accept_threshold", p.accept_threshold)?;
        unit("policy.clarify_threshold", p.clarify_threshold)?;
        unit("policy.intent_margin", p.intent_margin)?;
        unit("policy.missing_expected_penalty", p.missing_expected_penalty)?;
        if p.clarify_threshold > p.accept_threshold {
            return Err(Error::invalid_config(
                "policy.clarify_threshold",
                format!(
                    "{} is above the accept threshold {}",
                    p.clarify_threshold, p.accept_threshold
                ),
            ));
        }
        if p.max_clarify_options < 2 {
            return Err(Error::invalid_config(
                "policy.max_clarify_options",
                "a question needs at least 2 options",
            ));
        }
        if (p.missing_expected_penalty - 1.0).abs() < f64::EPSILON {
            return Err(Error::invalid_config(
                "policy.missing_expected_penalty",
                "must be below 1",
            ));
        }
        if p.max_input_tokens == 0 {
            return Err(Error::invalid_config("policy.max_input_tokens", "must be positive"));
        }
        if self.clarification.ttl_ms == 0 {
            return Err(Error::invalid_config("clarification.ttl_ms", "must be positive"));
        }
        if self.clarification.max_pending == 0 {
            return Err(Error::invalid_config("clarification.max_pending", "must be positive"));
        }
        self.resolver.validate()
    }
}

fn unit(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(field, format!("{value} is outside [0, 1]")))
    }
}
