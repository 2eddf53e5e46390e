use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classifier::RiskLevel;
use super::domain::AssessmentKind;

/// Identifier of one interactive session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Headline result recorded for an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HistoryResult {
    Score(u32),
    Risk(RiskLevel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentHistoryEntry {
    pub assessment: AssessmentKind,
    pub result: HistoryResult,
    pub severity: String,
    pub recorded_at: DateTime<Utc>,
}

/// Sessions kept before the least recently created one is dropped.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;
/// Entries kept per session; older entries are dropped first.
pub const DEFAULT_MAX_ENTRIES_PER_SESSION: usize = 100;

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<SessionId, Vec<AssessmentHistoryEntry>>,
    created: VecDeque<SessionId>,
}

/// In-memory, per-session assessment history. Bounded, and dropped with the process.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<Sessions>>,
    max_sessions: usize,
    max_entries: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_SESSIONS, DEFAULT_MAX_ENTRIES_PER_SESSION)
    }
}

impl SessionStore {
    /// Limits below one are raised to one.
    pub fn with_limits(max_sessions: usize, max_entries: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Sessions::default())),
            max_sessions: max_sessions.max(1),
            max_entries: max_entries.max(1),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Sessions> {
        // A poisoned map still holds consistent per-session vectors.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn append(&self, session: &SessionId, entry: AssessmentHistoryEntry) {
        let mut sessions = self.guard();

        if !sessions.entries.contains_key(session) {
            while sessions.entries.len() >= self.max_sessions {
                let Some(oldest) = sessions.created.pop_front() else {
                    break;
                };
                sessions.entries.remove(&oldest);
                debug!(session = %oldest.0, "evicted session history");
            }
            sessions.created.push_back(session.clone());
        }

        let history = sessions.entries.entry(session.clone()).or_default();
        history.push(entry);
        if history.len() > self.max_entries {
            let excess = history.len() - self.max_entries;
            history.drain(..excess);
        }
    }

    /// Oldest entry first; unknown sessions have an empty history.
    pub fn history(&self, session: &SessionId) -> Vec<AssessmentHistoryEntry> {
        self.guard()
            .entries
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    /// Ends a session. Returns whether it had any history.
    pub fn clear(&self, session: &SessionId) -> bool {
        let mut sessions = self.guard();
        sessions.created.retain(|known| known != session);
        sessions.entries.remove(session).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.guard().entries.len()
    }
}
