// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the sync core.
//!
//! Three layers:
//! - [`AppError`]: faults of the crate's own collaborators (storage, credentials, setup).
//! - [`FetchFailure`]: classified outcome of a failed remote call.
//! - [`SyncError`]: what a consumer receives inside `SyncState::Error`.

use crate::sync::messages;

/// Crate-level error for storage, credential and setup faults.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Cache storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Credential store error: {0}")]
    Credentials(String),

    #[error("Session expiry out of range: {0}s")]
    ExpiryOutOfRange(i64),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Classified failure of a call to the meal-plan API.
///
/// Kept distinct per cause: `Unauthorized` invalidates the session, the rest do not.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure {
    #[error("HTTP 401 Unauthorized")]
    Unauthorized,

    #[error("HTTP 403 Forbidden")]
    Forbidden,

    #[error("HTTP 404 Not Found")]
    NotFound,

    #[error("HTTP {0} server error")]
    ServerError(u16),

    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("HTTP {0}: {1}")]
    Other(u16, String),
}

impl FetchFailure {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => FetchFailure::Unauthorized,
            403 => FetchFailure::Forbidden,
            404 => FetchFailure::NotFound,
            500..=599 => FetchFailure::ServerError(status),
            _ => FetchFailure::Other(status, body),
        }
    }

    /// Classify a transport-level reqwest error (no HTTP status received).
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout
        } else if err.is_decode() {
            FetchFailure::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            FetchFailure::from_status(status.as_u16(), err.to_string())
        } else {
            FetchFailure::NetworkUnreachable(err.to_string())
        }
    }

    /// Whether the failure is a transport fault worth an immediate retry.
    pub fn is_transient_transport(&self) -> bool {
        matches!(self, FetchFailure::NetworkUnreachable(_))
    }

    /// Consumer-facing category of this failure.
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            FetchFailure::Unauthorized => SyncErrorKind::Unauthorized,
            FetchFailure::Forbidden => SyncErrorKind::Forbidden,
            FetchFailure::NotFound => SyncErrorKind::NotFound,
            FetchFailure::ServerError(_) => SyncErrorKind::ServerError,
            FetchFailure::NetworkUnreachable(_) => SyncErrorKind::NetworkUnreachable,
            FetchFailure::Timeout => SyncErrorKind::Timeout,
            FetchFailure::Malformed(_) => SyncErrorKind::Malformed,
            FetchFailure::Other(..) => SyncErrorKind::Unknown,
        }
    }
}

/// Category of a sync failure. Consumers branch on this, never on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncErrorKind {
    NotAuthenticated,
    SessionExpired,
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    NetworkUnreachable,
    Timeout,
    Malformed,
    FilteredEmpty,
    Storage,
    Unknown,
}

impl SyncErrorKind {
    /// The consumer should send the user back to the login screen.
    pub fn requires_reauth(self) -> bool {
        matches!(
            self,
            SyncErrorKind::NotAuthenticated
                | SyncErrorKind::SessionExpired
                | SyncErrorKind::Unauthorized
        )
    }

    /// Reaching this error clears the stored session.
    pub fn invalidates_session(self) -> bool {
        matches!(self, SyncErrorKind::SessionExpired | SyncErrorKind::Unauthorized)
    }
}

/// Error delivered to consumers: a category plus an optional diagnostic detail.
///
/// `Display` yields only the user-facing message; `detail` is for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncError {
    pub kind: SyncErrorKind,
    pub detail: Option<String>,
}

impl SyncError {
    pub fn new(kind: SyncErrorKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: SyncErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }

    /// User-facing message for this error.
    pub fn message(&self) -> &'static str {
        messages::describe(self.kind)
    }

    pub fn requires_reauth(&self) -> bool {
        self.kind.requires_reauth()
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for SyncError {}

impl From<FetchFailure> for SyncError {
    fn from(failure: FetchFailure) -> Self {
        SyncError::with_detail(failure.kind(), failure.to_string())
    }
}

impl From<AppError> for SyncError {
    fn from(err: AppError) -> Self {
        let kind = match &err {
            AppError::Storage(_) | AppError::Credentials(_) => SyncErrorKind::Storage,
            AppError::ExpiryOutOfRange(_) => SyncErrorKind::Malformed,
            _ => SyncErrorKind::Unknown,
        };
        SyncError::with_detail(kind, err.to_string())
    }
}
