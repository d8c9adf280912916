//! Runtime configuration.
//!
//! Loaded from a JSON file. Every field is optional; missing fields take
//! their defaults, so `{}` is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use haggle_debug::CoverageConfig;
use haggle_engine::EngineConfig;
use haggle_foundation::{Error, ErrorKind, Result};

/// Configuration for the REPL and batch runner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Engine thresholds, fuzzy matching constants and clarification limits.
    pub engine: EngineConfig,
    /// Coverage logging.
    pub coverage: CoverageConfig,
    /// Session id used for typed commands.
    pub session: String,
    /// Primary prompt.
    pub prompt: String,
    /// Print responses as JSON.
    pub json: bool,
    /// Extra grammar DSL compiled after the standard grammar.
    pub grammar_extension: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            coverage: CoverageConfig::default(),
            session: "player-1".to_string(),
            prompt: "haggle> ".to_string(),
            json: false,
            grammar_extension: None,
        }
    }
}

impl RuntimeConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the text is not a valid configuration,
    /// or an invalid configuration error if the engine thresholds do not
    /// validate.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::new(ErrorKind::Io(format!("failed to read config '{}': {e}", path.display()))))?;
        Self::from_json(&text).map_err(|e| e.with_context(format!("in {}", path.display())))
    }

    /// Renders the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if rendering fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
    }

    /// Builder method to replace the engine configuration.
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Builder method to set JSON output.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}
