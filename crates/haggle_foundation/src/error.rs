//! Error types for the haggle engine.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Errors are reserved for load-time problems (grammar, configuration) and
//! the runtime's file handling. Per-command problems such as unknown words or
//! ambiguous names are outcomes, not errors.

use thiserror::Error;

/// The main error type for haggle operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<String>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Creates a DSL syntax error.
    #[must_use]
    pub fn dsl_syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::DslSyntax {
            message: message.into(),
            line,
            column,
        })
    }

    /// Creates an invalid grammar error.
    #[must_use]
    pub fn invalid_grammar(rule: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidGrammar {
            rule: rule.map(str::to_string),
            message: message.into(),
        })
    }

    /// Creates an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(rule: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPattern {
            rule: rule.to_string(),
            message: message.into(),
        })
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        })
    }

    /// Returns true if this error came from validating grammar or configuration.
    ///
    /// These errors are fatal at startup and never occur while parsing a command.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::DslSyntax { .. }
                | ErrorKind::InvalidGrammar { .. }
                | ErrorKind::InvalidPattern { .. }
                | ErrorKind::UnknownIntent(_)
                | ErrorKind::UnknownSlotKind(_)
                | ErrorKind::DuplicateRule(_)
                | ErrorKind::InvalidConfig { .. }
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Grammar DSL could not be read.
    #[error("grammar syntax error at {line}:{column}: {message}")]
    DslSyntax {
        /// Description of the problem.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// Grammar declaration is structurally invalid.
    #[error("invalid grammar{}: {message}", rule_suffix(.rule))]
    InvalidGrammar {
        /// The rule being compiled, if any.
        rule: Option<String>,
        /// Description of the problem.
        message: String,
    },

    /// A rule's token pattern is invalid.
    #[error("invalid pattern in rule {rule}: {message}")]
    InvalidPattern {
        /// The rule being compiled.
        rule: String,
        /// Description of the problem.
        message: String,
    },

    /// Grammar names an intent that does not exist.
    #[error("unknown intent: {0}")]
    UnknownIntent(String),

    /// Grammar names a slot kind that does not exist.
    #[error("unknown slot kind: {0}")]
    UnknownSlotKind(String),

    /// Two rules share an id.
    #[error("duplicate rule id: {0}")]
    DuplicateRule(String),

    /// A threshold or weighting constant is out of range.
    #[error("invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Description of the problem.
        message: String,
    },

    /// I/O failure (config files, exports).
    #[error("i/o error: {0}")]
    Io(String),

    /// Serialization failure (config files, exports).
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn rule_suffix(rule: &Option<String>) -> String {
    rule.as_ref().map(|r| format!(" in rule {r}")).unwrap_or_default()
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err.to_string()))
    }
}

/// Result type alias using the haggle error.
pub type Result<T> = std::result::Result<T, Error>;
