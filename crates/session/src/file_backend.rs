//! File-based session store — one JSON document per session.
//!
//! Each session lives at `<dir>/<hex(session_id)>.json` as
//! `{"expires_at": ..., "state": {...}}`. Hex-encoding the id keeps
//! arbitrary client ids safe as file names.
//!
//! Storage location: `~/.locas/sessions/` unless configured.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use locas_core::error::SessionError;
use locas_core::session::{SessionState, SessionStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Serialize, Deserialize)]
struct StoredSession {
    expires_at: DateTime<Utc>,
    state: SessionState,
}

pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!(dir = %dir.display(), "File session store");
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        let encoded: String = session_id.bytes().map(|b| format!("{b:02x}")).collect();
        self.dir.join(format!("{encoded}.json"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionState>, SessionError> {
        let path = self.path_for(session_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Storage(format!("Failed to read session file: {e}"))),
        };

        let stored: StoredSession = serde_json::from_str(&content)
            .map_err(|e| SessionError::Serialization(format!("Corrupted session file {}: {e}", path.display())))?;

        if stored.expires_at <= Utc::now() {
            debug!(session_id, "Session expired");
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(error = %e, "Failed to remove expired session file");
            }
            return Ok(None);
        }

        Ok(Some(stored.state))
    }

    async fn put(&self, session_id: &str, state: &SessionState, ttl: Duration) -> Result<(), SessionError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SessionError::Storage(format!("Failed to create session directory: {e}")))?;

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| SessionError::Storage(format!("Session TTL out of range: {e}")))?;
        let stored = StoredSession {
            expires_at: Utc::now() + ttl,
            state: state.clone(),
        };
        let content = serde_json::to_string(&stored)
            .map_err(|e| SessionError::Serialization(format!("Failed to serialize session: {e}")))?;

        // Write a temp file, then rename over the old one
        let path = self.path_for(session_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| SessionError::Storage(format!("Failed to write session file: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| SessionError::Storage(format!("Failed to replace session file: {e}")))?;

        Ok(())
    }

    async fn ping(&self) -> bool {
        if tokio::fs::create_dir_all(&self.dir).await.is_err() {
            return false;
        }
        tokio::fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false)
    }
}
