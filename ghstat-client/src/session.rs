//! Session persistence
//!
//! Keeps the Greenhouse session cookies between runs so the login step can be
//! skipped while the session is still valid. Persistence is a convenience:
//! callers log failures from this module and carry on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ClientError, Result};

/// Application name the session file is stored under
pub const APP_NAME: &str = "ghstat";
const SESSION_FILE_NAME: &str = "ghstat.json";

/// A single stored cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
}

/// Opaque session state, currently the set of session cookies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub cookies: Vec<StoredCookie>,
}

impl SessionState {
    /// Parses a raw `Cookie` header value (`a=1; b=2`)
    pub fn from_cookie_header(raw: &str) -> Self {
        let mut state = Self::default();
        for pair in raw.split(';') {
            if let Some((name, value)) = pair.split_once('=') {
                state.set(name.trim(), value.trim());
            }
        }
        state
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Value for the `Cookie` request header, if there are any cookies
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let header = self
            .cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        Some(header)
    }

    /// Inserts or replaces a cookie; an empty value removes it
    pub fn set(&mut self, name: &str, value: &str) {
        if name.is_empty() {
            return;
        }
        self.cookies.retain(|c| c.name != name);
        if !value.is_empty() {
            self.cookies.push(StoredCookie {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Overlays every cookie of `other`, replacing cookies with the same name
    pub fn merge(&mut self, other: &SessionState) {
        for cookie in &other.cookies {
            self.set(&cookie.name, &cookie.value);
        }
    }

    /// Applies a `Set-Cookie` response header
    ///
    /// A cookie sent with `Max-Age <= 0` or an `Expires` date in the past is
    /// removed.
    pub fn apply_set_cookie(&mut self, header: &str) {
        let mut parts = header.split(';');
        let Some((name, value)) = parts.next().and_then(|first| first.split_once('=')) else {
            return;
        };

        let expired = parts.any(|attr| {
            let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
            let val = val.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "max-age" => val.parse::<i64>().is_ok_and(|age| age <= 0),
                "expires" => DateTime::parse_from_rfc2822(val)
                    .is_ok_and(|at| at.with_timezone(&Utc) <= Utc::now()),
                _ => false,
            }
        });

        if expired {
            self.set(name.trim(), "");
        } else {
            self.set(name.trim(), value.trim());
        }
    }
}

/// Storage for session state between runs
pub trait SessionStore: Send + Sync {
    /// Loads previously saved state
    fn load(&self) -> Result<SessionState>;

    /// Persists the given state, replacing anything saved before
    fn save(&self, state: &SessionState) -> Result<()>;
}

/// Stores the session as JSON in the user's config directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Creates a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config_dir>/ghstat/ghstat.json`
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ClientError::Session("config directory not found, cannot store session".into())
        })?;
        Ok(Self::new(dir.join(APP_NAME).join(SESSION_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<SessionState> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            ClientError::Session(format!(
                "failed to open session file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            ClientError::Session(format!(
                "failed to parse session file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::Session(format!("mkdir {}: {}", parent.display(), e))
            })?;
        }

        let raw = serde_json::to_string_pretty(state)
            .map_err(|e| ClientError::Session(format!("could not serialize session: {}", e)))?;

        fs::write(&self.path, raw).map_err(|e| {
            ClientError::Session(format!(
                "could not write session file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)) {
                tracing::warn!("failed to chmod 0600 {}: {}", self.path.display(), e);
            }
        }

        Ok(())
    }
}

/// Keeps the session in memory only
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<Option<SessionState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last saved state
    pub fn saved(&self) -> Option<SessionState> {
        self.state.lock().ok().and_then(|s| s.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionState> {
        self.saved()
            .ok_or_else(|| ClientError::Session("no saved session".into()))
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| ClientError::Session("session lock poisoned".into()))?;
        *guard = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_round_trip() {
        let state = SessionState::from_cookie_header("_session=abc; remember=1");
        assert_eq!(state.cookies.len(), 2);
        assert_eq!(
            state.cookie_header().as_deref(),
            Some("_session=abc; remember=1")
        );
    }

    #[test]
    fn test_empty_state_has_no_header() {
        assert_eq!(SessionState::default().cookie_header(), None);
    }

    #[test]
    fn test_set_cookie_replaces_and_removes() {
        let mut state = SessionState::from_cookie_header("_session=abc");
        state.apply_set_cookie("_session=def; Path=/; HttpOnly");
        assert_eq!(state.cookie_header().as_deref(), Some("_session=def"));

        state.apply_set_cookie("_session=; Max-Age=0");
        assert!(state.is_empty());
    }

    #[test]
    fn test_expired_set_cookie_removes_value() {
        let mut state = SessionState::from_cookie_header("_session=abc; remember=1");
        state.apply_set_cookie("_session=deleted; Path=/; Max-Age=0");
        assert_eq!(state.cookie_header().as_deref(), Some("remember=1"));

        state.apply_set_cookie("remember=gone; expires=Thu, 01 Jan 1970 00:00:00 GMT");
        assert!(state.is_empty());

        state.apply_set_cookie("_session=new; Max-Age=3600; Expires=Fri, 01 Jan 2100 00:00:00 GMT");
        assert_eq!(state.cookie_header().as_deref(), Some("_session=new"));
    }

    #[test]
    fn test_merge_overrides_matching_cookies() {
        let mut saved = SessionState::from_cookie_header("_session=stale; remember=1");
        saved.merge(&SessionState::from_cookie_header("_session=fresh"));
        assert_eq!(
            saved.cookie_header().as_deref(),
            Some("remember=1; _session=fresh")
        );
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("ghstat.json"));
        let state = SessionState::from_cookie_header("_session=abc");

        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("missing.json"));
        assert!(matches!(store.load(), Err(ClientError::Session(_))));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ghstat.json");
        fs::write(&path, "not json").unwrap();
        let store = FileSessionStore::new(path);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert!(store.load().is_err());
        store
            .save(&SessionState::from_cookie_header("a=1"))
            .unwrap();
        assert_eq!(store.saved().unwrap().cookies.len(), 1);
    }
}
