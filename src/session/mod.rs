//! Browser-session key/value store with explicit expiry.
//!
//! Holds short-lived values that must survive between two HTTP requests of
//! the same browser, such as the webservice id remembered between the OAuth
//! start and callback legs. Every value expires `ttl` after it was written;
//! expired sessions are swept by [`run_session_cleanup`].

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A stored value and when it was written
#[derive(Clone, Debug)]
struct SessionValue {
    value: String,
    stored_at: DateTime<Utc>,
}

/// One-shot user message displayed on the next page
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: String,
    pub message: String,
}

#[derive(Debug)]
struct SessionData {
    values: HashMap<String, SessionValue>,
    flashes: Vec<Flash>,
    touched_at: DateTime<Utc>,
}

impl SessionData {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            flashes: Vec::new(),
            touched_at: Utc::now(),
        }
    }
}

/// Session store with automatic expiration
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionData>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a new session store
    ///
    /// # Arguments
    /// * `ttl_seconds` - How long a written value remains readable
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Open a new empty session and return its id (UUID v4)
    pub fn create_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions.insert(session_id.clone(), SessionData::new());
        session_id
    }

    /// Store `value` under `key`, creating the session if needed
    pub fn set(&self, session_id: &str, key: &str, value: &str) {
        let now = Utc::now();
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionData::new);
        session.touched_at = now;
        session.values.insert(
            key.to_string(),
            SessionValue {
                value: value.to_string(),
                stored_at: now,
            },
        );
    }

    /// Read a value; `None` when missing or older than the TTL
    pub fn get(&self, session_id: &str, key: &str) -> Option<String> {
        let session = self.sessions.get(session_id)?;
        let entry = session.values.get(key)?;
        if Utc::now() - entry.stored_at > self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Remove a value, returning it if it was still valid
    pub fn remove(&self, session_id: &str, key: &str) -> Option<String> {
        let mut session = self.sessions.get_mut(session_id)?;
        let entry = session.values.remove(key)?;
        if Utc::now() - entry.stored_at > self.ttl {
            return None;
        }
        Some(entry.value)
    }

    /// Queue a flash message for the session
    pub fn add_flash(&self, session_id: &str, level: &str, message: &str) {
        let mut session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(SessionData::new);
        session.touched_at = Utc::now();
        session.flashes.push(Flash {
            level: level.to_string(),
            message: message.to_string(),
        });
    }

    /// Drain queued flash messages
    pub fn take_flashes(&self, session_id: &str) -> Vec<Flash> {
        match self.sessions.get_mut(session_id) {
            Some(mut session) => std::mem::take(&mut session.flashes),
            None => Vec::new(),
        }
    }

    /// Drop sessions that were not written to within the TTL
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.sessions
            .retain(|_, session| now - session.touched_at <= self.ttl);
    }

    /// Number of live sessions (for debugging/monitoring)
    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

/// Background task to periodically clean up expired sessions
pub async fn run_session_cleanup(store: SessionStore, interval_seconds: u64) {
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds));

    loop {
        interval.tick().await;
        store.cleanup_expired();
        tracing::debug!(remaining = store.count(), "Session cleanup complete");
    }
}
