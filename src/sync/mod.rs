// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Offline-first meal-plan synchronization.
//!
//! [`MealPlanRepository`] combines the session gate, the remote source and the
//! local cache into a stream of [`SyncState`] values. [`SyncCoordinator`]
//! keeps at most one sync in flight per consumer.

pub mod coordinator;
pub mod filter;
pub mod messages;
pub mod repository;

pub use coordinator::{SyncCoordinator, SyncSubscription};
pub use filter::AllergyFilter;
pub use repository::{MealPlanRepository, SyncStream};

use crate::error::SyncError;
use crate::models::MealItem;
use std::str::FromStr;

/// Lifecycle value observed by consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncState<T> {
    Loading,
    Success(T),
    Error(SyncError),
}

impl<T> SyncState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, SyncState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SyncState::Success(_))
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            SyncState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SyncState<U> {
        match self {
            SyncState::Loading => SyncState::Loading,
            SyncState::Success(value) => SyncState::Success(f(value)),
            SyncState::Error(e) => SyncState::Error(e),
        }
    }
}

/// Payload of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealPlanUpdate {
    /// The cache was rewritten; re-read it with [`MealPlanRepository::cached`].
    CacheRefreshed,
    /// A full replacement of the displayed items.
    Items(Vec<MealItem>),
}

/// Orchestration strategy, fixed when the repository is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Clear the cache, fetch, persist. No stale fallback.
    #[default]
    RemoteFirst,
    /// Serve the cache immediately, refresh from the remote best-effort.
    CacheFirst,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sync policy: {0}")]
pub struct UnknownPolicy(pub String);

impl FromStr for SyncPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "remote_first" => Ok(SyncPolicy::RemoteFirst),
            "cache_first" => Ok(SyncPolicy::CacheFirst),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// What one sync should deliver.
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    /// Restrict reads to one meal slot.
    pub meal_slot: Option<String>,
    pub allergies: AllergyFilter,
}

impl SyncRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_slot(slot: impl Into<String>) -> Self {
        Self {
            meal_slot: Some(slot.into()),
            ..Self::default()
        }
    }

    pub fn with_allergies(mut self, allergies: AllergyFilter) -> Self {
        self.allergies = allergies;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncErrorKind;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("remote_first".parse::<SyncPolicy>().unwrap(), SyncPolicy::RemoteFirst);
        assert_eq!("Cache-First".parse::<SyncPolicy>().unwrap(), SyncPolicy::CacheFirst);
        assert!("eventually".parse::<SyncPolicy>().is_err());
    }

    #[test]
    fn test_state_map_keeps_variant() {
        let state: SyncState<u32> = SyncState::Success(2);
        assert_eq!(state.map(|n| n * 2), SyncState::Success(4));

        let state: SyncState<u32> = SyncState::Error(SyncError::new(SyncErrorKind::Timeout));
        let mapped = state.map(|n| n.to_string());
        assert_eq!(mapped.error().map(|e| e.kind), Some(SyncErrorKind::Timeout));
    }
}
