// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session gate: the single owner of the bearer credential.
//!
//! Handles:
//! - Validity checks against an injectable clock
//! - Durable persistence through a [`CredentialStore`]
//! - Invalidation on logout, expiry or a 401 from the API
//!
//! Readers always see a whole [`Session`] (token and expiry together) because
//! the in-memory snapshot is swapped under one lock after the store commits.

use crate::error::{AppError, FetchFailure, Result, SyncError, SyncErrorKind};
use crate::models::Session;
use crate::time_utils::{format_utc_rfc3339, Clock};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

/// Durable key-value home of the session fields.
pub trait CredentialStore: Send + Sync {
    /// Load the persisted session, if any.
    fn load(&self) -> Result<Option<Session>>;

    /// Persist all fields at once.
    fn save(&self, session: &Session) -> Result<()>;

    /// Erase all persisted fields.
    fn clear(&self) -> Result<()>;
}

/// Credential store backed by a JSON file, written via tmp file + atomic rename.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "credentials".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Session>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Credentials(e.to_string())),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt file is treated as "logged out" rather than a hard failure.
                tracing::warn!(error = %e, path = %self.path.display(), "Discarding unreadable credentials");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }

            let json = serde_json::to_vec(session)?;
            let tmp_path = self.temp_path();
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(&json)?;
            tmp_file.sync_all()?;
            drop(tmp_file);

            fs::rename(&tmp_path, &self.path)
        };

        write().map_err(|e| AppError::Credentials(e.to_string()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Credentials(e.to_string())),
        }
    }
}

/// In-process credential store for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemoryCredentialStore {
    session: Mutex<Option<Session>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// Outcome of a session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Usable bearer token.
    Valid(String),
    /// Never logged in, or logged out.
    Missing,
    /// A token exists but its window has passed.
    Expired,
}

/// Holds the current session and answers "is access valid right now".
pub struct SessionGate {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<Session>>,
}

impl SessionGate {
    /// Create a gate, restoring any session persisted by a previous run.
    pub fn new(store: Arc<dyn CredentialStore>, clock: Arc<dyn Clock>) -> Result<Self> {
        let restored = store.load()?;
        if let Some(session) = &restored {
            tracing::info!(
                expires_at = %format_utc_rfc3339(session.expires_at),
                "Restored persisted session"
            );
        }

        Ok(Self {
            store,
            clock,
            current: RwLock::new(restored),
        })
    }

    fn snapshot(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// True iff a token is present and not expired. No side effects.
    pub fn is_valid(&self) -> bool {
        matches!(self.status(), SessionStatus::Valid(_))
    }

    /// Current id token, if one is stored (regardless of expiry).
    pub fn token(&self) -> Option<String> {
        self.snapshot().map(|s| s.id_token).filter(|t| !t.is_empty())
    }

    /// Current refresh token, if one is stored.
    pub fn refresh_token(&self) -> Option<String> {
        self.snapshot().map(|s| s.refresh_token)
    }

    /// Expiry of the stored session.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot().map(|s| s.expires_at)
    }

    /// Check the session, distinguishing "never had one" from "expired".
    pub fn status(&self) -> SessionStatus {
        match self.snapshot() {
            Some(session) if session.is_valid_at(self.clock.now()) => {
                SessionStatus::Valid(session.id_token)
            }
            Some(session) if !session.id_token.is_empty() => SessionStatus::Expired,
            _ => SessionStatus::Missing,
        }
    }

    /// Bearer token for an authenticated call, or the reason there is none.
    ///
    /// An expired session is cleared as a side effect.
    pub fn authorize(&self) -> std::result::Result<String, SyncError> {
        let kind = match self.status() {
            SessionStatus::Valid(token) => return Ok(token),
            SessionStatus::Missing => SyncErrorKind::NotAuthenticated,
            SessionStatus::Expired => SyncErrorKind::SessionExpired,
        };
        tracing::info!(?kind, "Rejecting authenticated call");
        if kind.invalidates_session() {
            self.clear_logged();
        }
        Err(SyncError::new(kind))
    }

    /// Clear the session if the API rejected its token.
    pub fn invalidate_on(&self, failure: &FetchFailure) {
        if failure.kind().invalidates_session() {
            tracing::warn!(%failure, "Invalidating session");
            self.clear_logged();
        }
    }

    fn clear_logged(&self) {
        if let Err(e) = self.clear() {
            tracing::error!(error = %e, "Failed to erase persisted session");
        }
    }

    /// Store a freshly issued credential, expiring `expires_in_secs` from now.
    pub fn save(&self, id_token: &str, refresh_token: &str, expires_in_secs: i64) -> Result<()> {
        let now = self.clock.now();
        let session = Session::issued_at(id_token, refresh_token, now, expires_in_secs)
            .ok_or(AppError::ExpiryOutOfRange(expires_in_secs))?;

        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        self.store.save(&session)?;
        tracing::info!(
            expires_at = %format_utc_rfc3339(session.expires_at),
            "Session saved"
        );
        *current = Some(session);
        Ok(())
    }

    /// Erase the session from memory and durable storage.
    pub fn clear(&self) -> Result<()> {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        // Memory is cleared even if the store fails, so access stops immediately.
        *current = None;
        self.store.clear()?;
        tracing::info!("Session cleared");
        Ok(())
    }
}
