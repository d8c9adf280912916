//! Grammar coverage logging.
//!
//! A [`CoverageLog`] is a [`DiagnosticSink`]: attach it to an engine and it
//! keeps the most recent accepted commands, clarification questions and
//! rejections. Reports show which rules fire and which inputs fall through.
//!
//! # Example
//!
//! ```text
//! let log = Arc::new(CoverageLog::new(CoverageConfig::default()));
//! let engine = standard_engine(config)?.with_sink(log.clone());
//! ...
//! println!("{}", log.report());
//! log.export_to_file("coverage.msgpack")?;
//! ```

pub mod buffer;
pub mod export;
pub mod format;
pub mod record;
pub mod report;

pub use buffer::{CoverageBuffer, CoverageBufferStats};
pub use format::{CoverageFormatter, HumanFormatter, JsonFormatter};
pub use record::{ACCEPTED, CLARIFICATION, CoverageRecord, REJECTED};
pub use report::{CoverageReport, RuleCoverage};

use std::fmt;
use std::path::Path;
use std::time::Instant;

use parking_lot::Mutex;

use haggle_engine::{DiagnosticEvent, DiagnosticSink};
use haggle_foundation::{Result, SessionId};

use crate::config::CoverageConfig;

/// In-process coverage log.
///
/// Cheap when disabled: `record` returns before taking the lock.
pub struct CoverageLog {
    config: CoverageConfig,
    buffer: Mutex<CoverageBuffer>,
    start_time: Instant,
    human_formatter: HumanFormatter,
    json_formatter: JsonFormatter,
}

impl CoverageLog {
    /// Creates a log with the given configuration.
    #[must_use]
    pub fn new(config: CoverageConfig) -> Self {
        let buffer = CoverageBuffer::new(config.buffer_size);
        Self {
            config,
            buffer: Mutex::new(buffer),
            start_time: Instant::now(),
            human_formatter: HumanFormatter::new().with_ids().with_timestamps(),
            json_formatter: JsonFormatter::new(),
        }
    }

    /// Creates a log that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(CoverageConfig::disabled())
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Returns whether events are recorded.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn accepts(&self, event: &DiagnosticEvent) -> bool {
        self.config.event_filter.is_empty()
            || self
                .config
                .event_filter
                .iter()
                .any(|t| t == record::event_type(event))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Returns true if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies out every record, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<CoverageRecord> {
        self.buffer.lock().iter().cloned().collect()
    }

    /// Copies out the most recent `count` records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<CoverageRecord> {
        self.buffer.lock().recent(count).into_iter().cloned().collect()
    }

    /// Copies out one session's records.
    #[must_use]
    pub fn for_session(&self, session: &SessionId) -> Vec<CoverageRecord> {
        self.buffer.lock().for_session(session).into_iter().cloned().collect()
    }

    /// Returns buffer statistics.
    #[must_use]
    pub fn stats(&self) -> CoverageBufferStats {
        self.buffer.lock().stats()
    }

    /// Aggregates the held records.
    #[must_use]
    pub fn report(&self) -> CoverageReport {
        CoverageReport::from_records(self.buffer.lock().iter())
    }

    /// Drops every record.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }

    /// Formats records using the configured output format.
    #[must_use]
    pub fn format_records(&self, records: &[CoverageRecord]) -> String {
        let refs: Vec<&CoverageRecord> = records.iter().collect();
        if self.config.json_output {
            self.json_formatter.format_many(&refs)
        } else {
            self.human_formatter.format_many(&refs)
        }
    }

    /// Serializes the held records to `MessagePack`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export(&self) -> Result<Vec<u8>> {
        export::to_bytes(&self.records())
    }

    /// Writes the held records to a `MessagePack` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        export::save_to_file(&self.records(), path)
    }

    /// Appends records from an export, returning how many were read.
    ///
    /// Imported records are renumbered; their timestamps are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a coverage export.
    pub fn import(&self, bytes: &[u8]) -> Result<usize> {
        let records = export::from_bytes(bytes)?;
        let count = records.len();
        self.buffer.lock().extend(records);
        Ok(count)
    }
}

impl DiagnosticSink for CoverageLog {
    #[inline]
    fn record(&self, event: &DiagnosticEvent) {
        if !self.config.enabled || !self.accepts(event) {
            return;
        }
        let timestamp = self.elapsed_ms();
        let id = self.buffer.lock().push(timestamp, event.clone());
        if self.config.echo {
            tracing::info!(target: "haggle::coverage", id, kind = record::event_type(event), "{}", describe(event));
        }
    }
}

impl Default for CoverageLog {
    fn default() -> Self {
        Self::new(CoverageConfig::default())
    }
}

impl fmt::Debug for CoverageLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverageLog")
            .field("config", &self.config)
            .field("records", &self.len())
            .finish_non_exhaustive()
    }
}

/// One-line description of an event.
#[must_use]
pub fn describe(event: &DiagnosticEvent) -> String {
    match event {
        DiagnosticEvent::Accepted {
            rule_id, confidence, ..
        } => format!("accepted {rule_id} ({confidence:.2})"),
        DiagnosticEvent::ClarificationRequested { rule_id, options, .. } => {
            format!("asked about {rule_id} ({options} options)")
        }
        DiagnosticEvent::Rejected(diagnostic) => diagnostic.to_string(),
    }
}
