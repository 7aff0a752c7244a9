// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-facing text for sync errors. The only place messages are produced.

use crate::error::SyncErrorKind;

pub fn describe(kind: SyncErrorKind) -> &'static str {
    match kind {
        SyncErrorKind::NotAuthenticated => "not authenticated",
        SyncErrorKind::SessionExpired => "session expired, please log in again",
        SyncErrorKind::Unauthorized => "unauthorized, please log in again",
        SyncErrorKind::Forbidden => "access denied",
        SyncErrorKind::NotFound => "meal plan not found",
        SyncErrorKind::ServerError => "server error, please try again later",
        SyncErrorKind::NetworkUnreachable => "network unreachable",
        SyncErrorKind::Timeout => "timeout",
        SyncErrorKind::Malformed => "unexpected response from server",
        SyncErrorKind::FilteredEmpty => "no items match after filtering",
        SyncErrorKind::Storage => "local storage error",
        SyncErrorKind::Unknown => "unexpected error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchFailure, SyncError};

    #[test]
    fn test_fixed_messages() {
        assert_eq!(describe(SyncErrorKind::NotAuthenticated), "not authenticated");
        assert_eq!(describe(SyncErrorKind::Timeout), "timeout");
        assert_eq!(
            describe(SyncErrorKind::FilteredEmpty),
            "no items match after filtering"
        );
    }

    #[test]
    fn test_display_hides_detail() {
        let err = SyncError::from(FetchFailure::ServerError(503));
        assert_eq!(err.kind, SyncErrorKind::ServerError);
        assert_eq!(err.to_string(), "server error, please try again later");
        assert!(err.detail.as_deref().unwrap_or_default().contains("503"));
    }

    #[test]
    fn test_reauth_is_structural() {
        assert!(SyncError::new(SyncErrorKind::SessionExpired).requires_reauth());
        assert!(SyncError::from(FetchFailure::Unauthorized).requires_reauth());
        assert!(!SyncError::from(FetchFailure::Forbidden).requires_reauth());
        assert!(!SyncError::new(SyncErrorKind::FilteredEmpty).requires_reauth());
    }
}
