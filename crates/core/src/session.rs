//! Session state and the storage trait behind it.
//!
//! A session is keyed by an opaque client-supplied id. It carries the chat
//! history and the last coordinate used, so a later turn can say "there".

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::geo::Coordinate;
use crate::message::ChatEntry;

/// Everything persisted for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,

    #[serde(default)]
    pub history: Vec<ChatEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_location: Option<Coordinate>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    /// A fresh, empty session.
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            history: Vec::new(),
            last_location: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Key-value persistence for sessions with per-entry retention.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// A short backend name for logs and health output.
    fn name(&self) -> &str;

    /// Load a session; expired or unknown ids are `Ok(None)`.
    async fn get(&self, session_id: &str) -> Result<Option<SessionState>, SessionError>;

    /// Replace the stored session, retained for `ttl`.
    async fn put(&self, session_id: &str, state: &SessionState, ttl: Duration) -> Result<(), SessionError>;

    /// Is the backend reachable?
    async fn ping(&self) -> bool;
}
