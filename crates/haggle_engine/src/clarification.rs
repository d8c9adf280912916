//! Suspended clarification state.
//!
//! At most one question is pending per session. A new parse for the session
//! supersedes it, the store holds at most `max_pending` entries (evicting the
//! oldest) and entries expire after a time-to-live.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use haggle_foundation::{ParseContext, SessionId};

use crate::config::ClarificationConfig;
use crate::policy::{ClarificationTarget, ScoredCandidate};

/// Identifies a pending clarification.
///
/// Derived from the session, the input and the context, so parsing the same
/// input twice yields the same token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClarificationToken(String);

impl ClarificationToken {
    /// Derives the token for an input.
    #[must_use]
    pub fn derive(session: &SessionId, raw_input: &str, context: &ParseContext) -> Self {
        let mut hasher = DefaultHasher::new();
        session.hash(&mut hasher);
        raw_input.trim().to_lowercase().hash(&mut hasher);
        context.scope_key().hash(&mut hasher);
        context.known_recipes.hash(&mut hasher);
        context.owned_businesses.hash(&mut hasher);
        context.balance.hash(&mut hasher);
        Self(format!("clr-{:016x}", hasher.finish()))
    }

    /// Wraps a token received from a caller.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClarificationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything needed to resume after the player answers.
#[derive(Clone, Debug)]
pub struct PendingClarification {
    /// The token handed to the caller.
    pub token: ClarificationToken,
    /// The original input.
    pub raw_input: String,
    /// The context of the original input.
    pub context: ParseContext,
    /// The candidate being clarified.
    pub winner: ScoredCandidate,
    /// Other candidates, for intent questions.
    pub competitors: Vec<ScoredCandidate>,
    /// What was asked.
    pub target: ClarificationTarget,
}

impl PendingClarification {
    /// The session that was asked.
    #[must_use]
    pub fn session(&self) -> &SessionId {
        &self.context.session
    }
}

/// Why a token could not be redeemed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TakeError {
    /// No pending clarification has this token.
    Unknown,
    /// The clarification expired; it belonged to this session.
    Expired(SessionId),
}

struct Entry {
    pending: PendingClarification,
    created: Instant,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    by_session: BTreeMap<SessionId, Entry>,
    next_seq: u64,
}

/// Bounded, per-session store of pending clarifications.
pub struct ClarificationStore {
    inner: Mutex<Inner>,
    ttl: Duration,
    max_pending: usize,
}

impl ClarificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: &ClarificationConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl: config.ttl(),
            max_pending: config.max_pending.max(1),
        }
    }

    /// Number of pending clarifications, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().by_session.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the session has a pending clarification.
    #[must_use]
    pub fn contains_session(&self, session: &SessionId) -> bool {
        self.inner.lock().by_session.contains_key(session)
    }

    /// Stores a clarification, replacing the session's previous one.
    ///
    /// Returns the session evicted to make room, if any.
    pub fn insert(&self, pending: PendingClarification, now: Instant) -> Option<SessionId> {
        let mut inner = self.inner.lock();
        let session = pending.session().clone();
        inner.by_session.remove(&session);

        let mut evicted = None;
        if inner.by_session.len() >= self.max_pending {
            let ttl = self.ttl;
            inner.by_session.retain(|_, e| now.duration_since(e.created) <= ttl);
        }
        if inner.by_session.len() >= self.max_pending {
            let oldest = inner
                .by_session
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(s, _)| s.clone());
            if let Some(oldest) = oldest {
                inner.by_session.remove(&oldest);
                tracing::debug!(session = %oldest, "evicted oldest pending clarification");
                evicted = Some(oldest);
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.by_session.insert(
            session,
            Entry {
                pending,
                created: now,
                seq,
            },
        );
        evicted
    }

    /// Drops the session's pending clarification, if any.
    pub fn supersede(&self, session: &SessionId) -> bool {
        self.inner.lock().by_session.remove(session).is_some()
    }

    /// Removes and returns the session's clarification if it has this token.
    ///
    /// A token presented by another session does not match, and the rightful
    /// session's question stays pending.
    ///
    /// # Errors
    ///
    /// [`TakeError::Unknown`] if the session has no entry with the token,
    /// [`TakeError::Expired`] if it is older than the time-to-live (it is
    /// removed either way).
    pub fn take(
        &self,
        session: &SessionId,
        token: &ClarificationToken,
        now: Instant,
    ) -> Result<PendingClarification, TakeError> {
        let mut inner = self.inner.lock();
        match inner.by_session.get(session) {
            Some(entry) if &entry.pending.token == token => {}
            _ => return Err(TakeError::Unknown),
        }
        let entry = inner.by_session.remove(session).ok_or(TakeError::Unknown)?;
        if now.duration_since(entry.created) > self.ttl {
            return Err(TakeError::Expired(session.clone()));
        }
        Ok(entry.pending)
    }

    /// Removes expired entries, returning how many were dropped.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.by_session.len();
        let ttl = self.ttl;
        inner.by_session.retain(|_, e| now.duration_since(e.created) <= ttl);
        before - inner.by_session.len()
    }
}

impl fmt::Debug for ClarificationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClarificationStore")
            .field("pending", &self.len())
            .field("ttl", &self.ttl)
            .field("max_pending", &self.max_pending)
            .finish()
    }
}
