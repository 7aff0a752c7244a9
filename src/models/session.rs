// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential plus its validity window, as persisted by the credential store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session expiring `expires_in_secs` after `now`.
    ///
    /// `None` if the expiry is not a representable timestamp.
    pub fn issued_at(
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
        now: DateTime<Utc>,
        expires_in_secs: i64,
    ) -> Option<Self> {
        let expires_at = chrono::Duration::try_seconds(expires_in_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))?;
        Some(Self {
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        })
    }

    /// Valid iff the token is non-empty and `now` is strictly before expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.id_token.is_empty() && now < self.expires_at
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
