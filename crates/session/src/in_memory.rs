//! In-memory session store — for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use locas_core::error::SessionError;
use locas_core::session::{SessionState, SessionStore};
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry {
    state: SessionState,
    expires_at: Instant,
}

/// Sessions held in a map with per-entry expiry.
///
/// Expired entries read as absent and are purged on the next write.
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Live (unexpired) session count.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().await.values().filter(|e| e.expires_at > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionState>, SessionError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(session_id)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.state.clone()))
    }

    async fn put(&self, session_id: &str, state: &SessionState, ttl: Duration) -> Result<(), SessionError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            session_id.to_string(),
            Entry {
                state: state.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}
