//! In-memory session store with idle eviction.
//!
//! Each [`Session`] owns one conversation handle behind a FIFO-fair
//! `tokio::sync::Mutex`, so turns against the same session run one at a time
//! in the order they were submitted. Bookkeeping (`last_activity`,
//! `message_count`) lives in atomics and never waits on a pending turn.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// One ongoing conversation.
pub struct Session<C> {
    id: String,
    conversation: Mutex<C>,
    created_at: DateTime<Utc>,
    /// Unix milliseconds of the most recent accepted message.
    last_activity_ms: AtomicI64,
    message_count: AtomicU64,
}

impl<C> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("last_activity", &self.last_activity())
            .field("message_count", &self.message_count())
            .finish()
    }
}

impl<C> Session<C> {
    fn new(id: &str, conversation: C, now: DateTime<Utc>) -> Self {
        // Activity is tracked at millisecond precision; keep created_at comparable
        let now = Utc.timestamp_millis_opt(now.timestamp_millis()).single().unwrap_or(now);
        Session {
            id: id.to_string(),
            conversation: Mutex::new(conversation),
            created_at: now,
            last_activity_ms: AtomicI64::new(now.timestamp_millis()),
            message_count: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        let ms = self.last_activity_ms.load(Ordering::Acquire);
        Utc.timestamp_millis_opt(ms).single().unwrap_or(self.created_at)
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::Acquire)
    }

    /// Record one accepted message at `now` and return the new count.
    ///
    /// `last_activity` never moves backwards, even if `now` is older than
    /// the stored value.
    pub fn touch_at(&self, now: DateTime<Utc>) -> u64 {
        self.last_activity_ms
            .fetch_max(now.timestamp_millis(), Ordering::AcqRel);
        self.message_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Wait for exclusive access to the conversation handle.
    ///
    /// Waiters are served in the order they called this method.
    pub async fn conversation(&self) -> MutexGuard<'_, C> {
        self.conversation.lock().await
    }

    /// Whether a turn is currently in flight on this session.
    pub fn is_busy(&self) -> bool {
        self.conversation.try_lock().is_err()
    }

    /// Milliseconds elapsed between the last activity and `now`.
    fn idle_ms(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis() - self.last_activity_ms.load(Ordering::Acquire)
    }
}

// ─────────────────────────────────────────────
// SessionStore
// ─────────────────────────────────────────────

/// Builds a fresh, empty-history conversation handle for a new session.
pub type ConversationFactory<C> = Box<dyn Fn() -> C + Send + Sync>;

/// Process-local mapping from session id to [`Session`].
///
/// Readers (lookups, health) share the lock; inserts, removals, and sweeps
/// take it exclusively.
pub struct SessionStore<C> {
    sessions: RwLock<HashMap<String, Arc<Session<C>>>>,
    factory: ConversationFactory<C>,
}

impl<C> SessionStore<C> {
    /// Create an empty store. `factory` is called once per new session.
    pub fn new(factory: impl Fn() -> C + Send + Sync + 'static) -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Get the session for `id`, creating it if it does not exist.
    pub async fn get_or_create(&self, id: &str) -> Arc<Session<C>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(id) {
                return session.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        // Another task may have inserted it while we waited for the write lock
        if let Some(session) = sessions.get(id) {
            return session.clone();
        }

        let session = Arc::new(Session::new(id, (self.factory)(), Utc::now()));
        sessions.insert(id.to_string(), session.clone());
        info!(session_id = %id, sessions = sessions.len(), "session created");
        session
    }

    /// Get or create the session for `id` and record one accepted message
    /// at `now`, returning the session and its new count.
    ///
    /// The map lock is held across the lookup and the touch, so a concurrent
    /// sweep either runs before (and the session is recreated fresh) or sees
    /// the new activity.
    pub async fn get_or_create_touched(&self, id: &str, now: DateTime<Utc>) -> (Arc<Session<C>>, u64) {
        {
            // Sweeps need the write lock; a read guard is enough to hold them off
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(id) {
                let count = session.touch_at(now);
                return (session.clone(), count);
            }
        }

        let mut sessions = self.sessions.write().await;
        let session = match sessions.get(id) {
            Some(session) => session.clone(),
            None => {
                let session = Arc::new(Session::new(id, (self.factory)(), now));
                sessions.insert(id.to_string(), session.clone());
                info!(session_id = %id, sessions = sessions.len(), "session created");
                session
            }
        };
        let count = session.touch_at(now);
        (session, count)
    }

    /// Look up an existing session without creating one.
    pub async fn get(&self, id: &str) -> Option<Arc<Session<C>>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Record one accepted message on `session`; returns the new count.
    pub fn touch(&self, session: &Session<C>) -> u64 {
        session.touch_at(Utc::now())
    }

    /// Delete the session for `id`. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(session_id = %id, "session removed");
        } else {
            debug!(session_id = %id, "remove: no such session");
        }
        removed
    }

    /// Evict every session idle for strictly longer than `idle_threshold`.
    ///
    /// A session idle for exactly `idle_threshold` is kept. Sessions with a
    /// turn in flight are never evicted. Returns the number removed.
    pub async fn sweep(&self, now: DateTime<Utc>, idle_threshold: Duration) -> usize {
        let threshold_ms = i64::try_from(idle_threshold.as_millis()).unwrap_or(i64::MAX);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, session| {
            let expired = session.idle_ms(now) > threshold_ms && !session.is_busy();
            if expired {
                info!(
                    session_id = %id,
                    messages = session.message_count(),
                    "session evicted after inactivity"
                );
            }
            !expired
        });

        let removed = before - sessions.len();
        debug!(removed, remaining = sessions.len(), "session sweep finished");
        removed
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Ids of all live sessions, sorted.
    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop every session at once. Returns how many were dropped.
    pub async fn shutdown(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let dropped = sessions.len();
        sessions.clear();
        info!(dropped, "session store shut down");
        dropped
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
