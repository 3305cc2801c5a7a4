//! In-memory cover letter sessions.
//!
//! Each session pairs one résumé/job description with its own workflow and
//! sits behind its own async mutex, so operations on the same drafts are
//! serialized while different sessions proceed independently.
//!
//! Sessions expire `ttl` after creation and the store never holds more than
//! `max_sessions`; the oldest session is evicted to make room.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::extraction::extractor::ResumeRecord;
use crate::generation::workflow::{CoverLetterWorkflow, WorkflowState};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

#[derive(Debug)]
pub struct CoverLetterSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resume: ResumeRecord,
    pub job_description: String,
    pub workflow: CoverLetterWorkflow,
}

impl CoverLetterSession {
    pub fn new(resume: ResumeRecord, job_description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            resume,
            job_description,
            workflow: CoverLetterWorkflow::new(),
        }
    }
}

pub type SharedSession = Arc<Mutex<CoverLetterSession>>;

/// Map entry; `created_at` and `state` are readable without the session lock.
#[derive(Clone)]
struct SessionEntry {
    created_at: DateTime<Utc>,
    state: watch::Receiver<WorkflowState>,
    session: SharedSession,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.created_at)
            .to_std()
            .map_or(false, |age| age >= self.ttl)
    }

    /// Stores a session and returns its id. Expired sessions are dropped first,
    /// then the oldest ones while the store is full.
    pub async fn insert(&self, session: CoverLetterSession) -> Uuid {
        let id = session.id;
        let entry = SessionEntry {
            created_at: session.created_at,
            state: session.workflow.watch_state(),
            session: Arc::new(Mutex::new(session)),
        };

        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, entry| !self.is_expired(entry, now));

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            info!("Evicted cover letter session {oldest} (store full)");
        }

        sessions.insert(id, entry);
        id
    }

    /// Returns the session unless it is unknown or expired.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id)?;
        if self.is_expired(entry, Utc::now()) {
            return None;
        }
        Some(entry.session.clone())
    }

    /// Current workflow state, read without waiting for the session lock.
    pub async fn state(&self, id: Uuid) -> Option<WorkflowState> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(&id)?;
        if self.is_expired(entry, Utc::now()) {
            return None;
        }
        let state = *entry.state.borrow();
        Some(state)
    }

    /// Returns whether a session was removed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drops every expired session and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        before - sessions.len()
    }

    /// Purges expired sessions every `period` until the returned task is aborted.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = store.purge_expired().await;
                if removed > 0 {
                    debug!("Purged {removed} expired cover letter sessions");
                }
            }
        })
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
