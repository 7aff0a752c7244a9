// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal-plan repository: session gate + remote source + local cache.
//!
//! `sync()` returns a lazy stream. Nothing runs until it is polled, and
//! dropping it drops the in-flight pipeline, cancelling the remote call and
//! any pending cache await. A cache write that already reached the blocking
//! pool still commits (atomically) but nothing is emitted afterwards.
//!
//! Ordering per sync: `Loading` first, then either one terminal `Error`, or
//! one `Success` (RemoteFirst), or up to two `Success` (CacheFirst).

use super::{AllergyFilter, MealPlanUpdate, SyncPolicy, SyncRequest, SyncState};
use crate::config::DEFAULT_SYNC_TIMEOUT_SECS;
use crate::db::MealCacheStore;
use crate::error::{FetchFailure, SyncError, SyncErrorKind};
use crate::models::MealItem;
use crate::services::{RemoteSource, SessionGate};
use futures_util::{stream, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Most states one sync can emit (Loading + two Success).
const MAX_STATES_PER_SYNC: usize = 3;

/// Stream of lifecycle states for one sync.
pub type SyncStream = Pin<Box<dyn Stream<Item = SyncState<MealPlanUpdate>> + Send>>;

/// Orchestrates meal-plan sync under a fixed [`SyncPolicy`].
///
/// Cheap to clone; clones share collaborators.
#[derive(Clone)]
pub struct MealPlanRepository {
    session: Arc<SessionGate>,
    remote: Arc<dyn RemoteSource>,
    cache: Arc<dyn MealCacheStore>,
    policy: SyncPolicy,
    timeout: Duration,
}

impl MealPlanRepository {
    pub fn new(
        session: Arc<SessionGate>,
        remote: Arc<dyn RemoteSource>,
        cache: Arc<dyn MealCacheStore>,
        policy: SyncPolicy,
    ) -> Self {
        Self {
            session,
            remote,
            cache,
            policy,
            timeout: Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECS),
        }
    }

    /// Override the remote call budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start a sync. The returned stream is lazy and single-consumer.
    pub fn sync(&self, request: SyncRequest) -> SyncStream {
        let (tx, rx) = mpsc::channel(MAX_STATES_PER_SYNC);
        let pipeline = self.clone().run(request, Emitter(tx));

        // The pipeline only makes progress while the merged stream is polled.
        let driver = stream::once(pipeline)
            .filter_map(|()| futures_util::future::ready(None::<SyncState<MealPlanUpdate>>));

        Box::pin(stream::select(ReceiverStream::new(rx), driver))
    }

    /// Read the cache for `slot`, filtered by `allergies`.
    ///
    /// A non-empty selection that filters to nothing is `FilteredEmpty`.
    pub async fn cached(
        &self,
        slot: Option<&str>,
        allergies: &AllergyFilter,
    ) -> Result<Vec<MealItem>, SyncError> {
        let rows = self.cache.select(slot).await?;
        let kept = allergies.apply(&rows);
        if kept.is_empty() && !rows.is_empty() {
            return Err(SyncError::new(SyncErrorKind::FilteredEmpty));
        }
        Ok(kept)
    }

    /// Drop every cached row.
    pub async fn clear_cache(&self) -> Result<(), SyncError> {
        self.cache.clear().await?;
        Ok(())
    }

    async fn run(self, request: SyncRequest, out: Emitter) {
        out.emit(SyncState::Loading).await;

        let token = match self.session.authorize() {
            Ok(token) => token,
            Err(e) => {
                out.fail(e).await;
                return;
            }
        };

        match self.policy {
            SyncPolicy::RemoteFirst => self.run_remote_first(&token, &out).await,
            SyncPolicy::CacheFirst => self.run_cache_first(&token, &request, &out).await,
        }
    }

    /// Clear, fetch, persist, then signal the consumer to re-read the cache.
    async fn run_remote_first(&self, token: &str, out: &Emitter) {
        if let Err(e) = self.cache.clear().await {
            out.fail(e.into()).await;
            return;
        }
        tracing::debug!("Cleared meal-plan cache before fetch");

        let items = match self.fetch(token).await {
            Ok(items) => items,
            Err(e) => {
                out.fail(e).await;
                return;
            }
        };

        if items.is_empty() {
            tracing::info!("No meal plans received from API");
        } else {
            let count = items.len();
            if let Err(e) = self.cache.insert_all(items).await {
                out.fail(e.into()).await;
                return;
            }
            tracing::info!(count, "Meal plans saved to cache");
        }

        out.emit(SyncState::Success(MealPlanUpdate::CacheRefreshed)).await;
    }

    /// Serve the cache first, then refresh it from the remote.
    async fn run_cache_first(&self, token: &str, request: &SyncRequest, out: &Emitter) {
        let slot = request.meal_slot.as_deref();
        let allergies = &request.allergies;

        let local = match self.cache.select(slot).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "Cache read failed, continuing with remote");
                Vec::new()
            }
        };

        let snapshot = allergies.apply(&local);
        let delivered = !snapshot.is_empty();
        if delivered {
            tracing::debug!(count = snapshot.len(), "Serving cached meal plans");
            out.emit(SyncState::Success(MealPlanUpdate::Items(snapshot))).await;
        }

        let refreshed = match self.fetch_and_store(token, slot).await {
            Ok(rows) => rows,
            Err(e) if delivered => {
                tracing::warn!(
                    kind = ?e.kind,
                    detail = e.detail.as_deref().unwrap_or_default(),
                    "Refresh failed, keeping cached meal plans"
                );
                return;
            }
            Err(e) => {
                out.fail(e).await;
                return;
            }
        };

        let kept = allergies.apply(&refreshed);
        if kept.is_empty() && !refreshed.is_empty() && !delivered {
            out.fail(SyncError::new(SyncErrorKind::FilteredEmpty)).await;
            return;
        }

        tracing::debug!(count = kept.len(), "Serving refreshed meal plans");
        out.emit(SyncState::Success(MealPlanUpdate::Items(kept))).await;
    }

    /// Fetch, replace the cache in one transaction, and re-read it.
    async fn fetch_and_store(
        &self,
        token: &str,
        slot: Option<&str>,
    ) -> Result<Vec<MealItem>, SyncError> {
        let items = self.fetch(token).await?;

        if items.is_empty() {
            tracing::info!("No meal plans received from API, keeping cache");
        } else {
            let count = items.len();
            self.cache.replace_all(items).await?;
            tracing::info!(count, "Meal plans replaced in cache");
        }

        Ok(self.cache.select(slot).await?)
    }

    /// Call the remote source under the configured timeout.
    async fn fetch(&self, token: &str) -> Result<Vec<MealItem>, SyncError> {
        tracing::debug!(timeout_secs = self.timeout.as_secs(), "Fetching meal plans");

        // Bound the call even if the source ignores its budget.
        let result = match tokio::time::timeout(
            self.timeout,
            self.remote.fetch_meal_plan(token, self.timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchFailure::Timeout),
        };

        match result {
            Ok(payload) => Ok(payload.into_items()),
            Err(failure) => {
                tracing::warn!(error = %failure, "Meal plan fetch failed");
                self.session.invalidate_on(&failure);
                Err(failure.into())
            }
        }
    }
}

/// Sending half of a sync stream.
struct Emitter(mpsc::Sender<SyncState<MealPlanUpdate>>);

impl Emitter {
    async fn emit(&self, state: SyncState<MealPlanUpdate>) {
        // A closed receiver means the consumer is gone; the pipeline is about to be dropped.
        let _ = self.0.send(state).await;
    }

    async fn fail(&self, error: SyncError) {
        tracing::info!(kind = ?error.kind, reason = error.message(), "Sync failed");
        self.emit(SyncState::Error(error)).await;
    }
}
