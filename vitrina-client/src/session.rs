// vitrina-client/src/session.rs
// Session collaborator: supplies the bearer token and is told to drop it on 401

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Source of the bearer credential for every backend call
///
/// The core never reads ambient storage itself; it asks the session for a
/// token and calls [`Session::invalidate`] when the backend answers 401.
pub trait Session: Send + Sync {
    fn token(&self) -> Option<String>;

    /// Terminate the session (forced logout)
    fn invalidate(&self);
}

/// In-process session
#[derive(Debug, Default)]
pub struct MemorySession {
    token: RwLock<Option<String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }
}

impl Session for MemorySession {
    fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn invalidate(&self) {
        tracing::info!("Session invalidated");
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Token file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredToken {
    pub token: String,
    /// Milliseconds since the Unix epoch
    pub saved_at: i64,
}

/// Session persisted as a JSON file
#[derive(Debug)]
pub struct StoredSession {
    path: PathBuf,
    cached: RwLock<Option<StoredToken>>,
}

impl StoredSession {
    /// Open the session file, loading any token already saved there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = Self::load(&path);
        Self {
            path,
            cached: RwLock::new(cached),
        }
    }

    fn load(path: &Path) -> Option<StoredToken> {
        if !path.exists() {
            return None;
        }
        let json = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&json) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    /// Save a token after login
    pub fn save(&self, token: impl Into<String>) -> std::io::Result<()> {
        let stored = StoredToken {
            token: token.into(),
            saved_at: chrono::Utc::now().timestamp_millis(),
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, json)?;
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = Some(stored);
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Session for StoredSession {
    fn token(&self) -> Option<String> {
        self.cached
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.token.clone())
    }

    fn invalidate(&self) {
        *self.cached.write().unwrap_or_else(|e| e.into_inner()) = None;
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove session file");
                return;
            }
        }
        tracing::info!("Session invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session() {
        let session = MemorySession::new();
        assert!(!session.is_logged_in());

        session.set_token("abc");
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.invalidate();
        assert!(session.token().is_none());
    }

    #[test]
    fn test_stored_session_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session").join("token.json");

        let session = StoredSession::open(&path);
        assert!(session.token().is_none());

        session.save("jwt-1").unwrap();
        assert!(session.exists());

        // A second handle sees the persisted token
        let reopened = StoredSession::open(&path);
        assert_eq!(reopened.token().as_deref(), Some("jwt-1"));

        reopened.invalidate();
        assert!(!reopened.exists());
        assert!(reopened.token().is_none());
    }

    #[test]
    fn test_corrupt_session_file_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "not json").unwrap();

        let session = StoredSession::open(&path);
        assert!(session.token().is_none());
    }
}
