//! Ring buffer for coverage records.
//!
//! Keeps the most recent records up to a fixed size.

use std::collections::{BTreeMap, VecDeque};

use haggle_engine::DiagnosticEvent;
use haggle_foundation::SessionId;

use super::record::CoverageRecord;

// =============================================================================
// Coverage Buffer
// =============================================================================

/// A ring buffer of coverage records.
///
/// Discards the oldest records when full.
#[derive(Clone, Debug)]
pub struct CoverageBuffer {
    /// The records, oldest first.
    records: VecDeque<CoverageRecord>,
    /// Maximum number of records to store.
    max_size: usize,
    /// Next record ID to assign.
    next_id: u64,
    /// Records dropped to make room.
    evicted: u64,
}

impl CoverageBuffer {
    /// Creates a new buffer with the given maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size: max_size.max(1),
            next_id: 0,
            evicted: 0,
        }
    }

    /// Pushes a new event, returning the assigned record ID.
    pub fn push(&mut self, timestamp_ms: u64, event: DiagnosticEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push_back(CoverageRecord::new(id, timestamp_ms, event));
        while self.records.len() > self.max_size {
            self.records.pop_front();
            self.evicted += 1;
        }
        id
    }

    /// Appends records read back from an export, renumbering them.
    pub fn extend(&mut self, records: impl IntoIterator<Item = CoverageRecord>) {
        for record in records {
            self.push(record.timestamp_ms, record.event);
        }
    }

    /// Returns the number of records in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Clears all records. IDs keep increasing.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns an iterator over all records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &CoverageRecord> {
        self.records.iter()
    }

    /// Returns the most recent N records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&CoverageRecord> {
        let start = self.records.len().saturating_sub(count);
        self.records.iter().skip(start).collect()
    }

    /// Returns records matching a predicate.
    pub fn filter<F>(&self, predicate: F) -> Vec<&CoverageRecord>
    where
        F: Fn(&CoverageRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).collect()
    }

    /// Returns records of a specific event type.
    #[must_use]
    pub fn by_event_type(&self, event_type: &str) -> Vec<&CoverageRecord> {
        self.filter(|r| r.event_type() == event_type)
    }

    /// Returns the records of one session.
    #[must_use]
    pub fn for_session(&self, session: &SessionId) -> Vec<&CoverageRecord> {
        self.filter(|r| r.session() == Some(session))
    }

    /// Returns statistics about the buffer.
    #[must_use]
    pub fn stats(&self) -> CoverageBufferStats {
        let mut event_counts = BTreeMap::new();
        for record in &self.records {
            *event_counts.entry(record.event_type()).or_insert(0) += 1;
        }
        CoverageBufferStats {
            record_count: self.records.len(),
            max_size: self.max_size,
            evicted: self.evicted,
            event_counts,
        }
    }
}

impl Default for CoverageBuffer {
    fn default() -> Self {
        Self::new(10_000)
    }
}

// =============================================================================
// Buffer Statistics
// =============================================================================

/// Statistics about a coverage buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageBufferStats {
    /// Number of records currently in buffer.
    pub record_count: usize,
    /// Maximum buffer size.
    pub max_size: usize,
    /// Records dropped because the buffer was full.
    pub evicted: u64,
    /// Count of each event type.
    pub event_counts: BTreeMap<&'static str, usize>,
}
