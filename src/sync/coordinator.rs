// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-consumer sync scheduling: latest request wins.
//!
//! Each consumer (a screen, a meal-slot tab) is identified by a key. Starting a
//! sync for a key aborts the one already in flight for that key, so a
//! superseded request never delivers late states. Dropping a subscription
//! cancels its sync.

use super::{MealPlanRepository, MealPlanUpdate, SyncRequest, SyncState, SyncStream};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

const SUBSCRIPTION_BUFFER: usize = 4;

struct InFlight {
    generation: u64,
    task: JoinHandle<()>,
}

/// Shared map of in-flight syncs, keyed by consumer.
type InFlightMap = Arc<DashMap<String, InFlight>>;

/// Runs syncs on behalf of consumers, one at a time per consumer.
pub struct SyncCoordinator {
    repository: MealPlanRepository,
    in_flight: InFlightMap,
    next_generation: AtomicU64,
}

impl SyncCoordinator {
    pub fn new(repository: MealPlanRepository) -> Self {
        Self {
            repository,
            in_flight: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn repository(&self) -> &MealPlanRepository {
        &self.repository
    }

    /// Start a sync for `consumer`, superseding any sync it already has running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request(&self, consumer: &str, request: SyncRequest) -> SyncSubscription {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let stream = self.repository.sync(request);

        // Holding the entry while spawning keeps the task's own bookkeeping
        // from running before it is registered.
        match self.in_flight.entry(consumer.to_string()) {
            Entry::Occupied(mut entry) => {
                let task = spawn_forwarder(self.in_flight.clone(), consumer, generation, stream, tx);
                let previous = entry.insert(InFlight { generation, task });
                previous.task.abort();
                tracing::debug!(
                    consumer,
                    superseded = previous.generation,
                    generation,
                    "Superseded in-flight sync"
                );
            }
            Entry::Vacant(entry) => {
                let task = spawn_forwarder(self.in_flight.clone(), consumer, generation, stream, tx);
                entry.insert(InFlight { generation, task });
            }
        }

        SyncSubscription {
            consumer: consumer.to_string(),
            generation,
            inner: ReceiverStream::new(rx),
        }
    }

    /// Cancel the consumer's in-flight sync, if any. Returns whether one was running.
    pub fn cancel(&self, consumer: &str) -> bool {
        match self.in_flight.remove(consumer) {
            Some((_, in_flight)) => {
                in_flight.task.abort();
                tracing::debug!(consumer, generation = in_flight.generation, "Cancelled sync");
                true
            }
            None => false,
        }
    }

    /// Whether `consumer` has a sync running.
    pub fn is_in_flight(&self, consumer: &str) -> bool {
        self.in_flight.contains_key(consumer)
    }

    /// Number of consumers with a sync running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        for entry in self.in_flight.iter() {
            entry.task.abort();
        }
    }
}

fn spawn_forwarder(
    in_flight: InFlightMap,
    consumer: &str,
    generation: u64,
    stream: SyncStream,
    tx: mpsc::Sender<SyncState<MealPlanUpdate>>,
) -> JoinHandle<()> {
    let key = consumer.to_string();
    tokio::spawn(async move {
        tokio::select! {
            _ = forward(stream, &tx, &in_flight, &key, generation) => {}
            _ = tx.closed() => {
                tracing::debug!(consumer = %key, generation, "Consumer gone, cancelling sync");
            }
        }
        in_flight.remove_if(&key, |_, f| f.generation == generation);
    })
}

async fn forward(
    mut stream: SyncStream,
    tx: &mpsc::Sender<SyncState<MealPlanUpdate>>,
    in_flight: &InFlightMap,
    key: &str,
    generation: u64,
) {
    while let Some(state) = stream.next().await {
        let current = in_flight
            .get(key)
            .map(|f| f.generation == generation)
            .unwrap_or(false);
        if !current {
            tracing::debug!(consumer = %key, generation, "Discarding state of superseded sync");
            return;
        }
        if tx.send(state).await.is_err() {
            return;
        }
    }
}

/// States of one requested sync, as seen by its consumer.
///
/// Ends after the terminal state, or early if the sync was superseded or cancelled.
pub struct SyncSubscription {
    consumer: String,
    generation: u64,
    inner: ReceiverStream<SyncState<MealPlanUpdate>>,
}

impl SyncSubscription {
    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Stream for SyncSubscription {
    type Item = SyncState<MealPlanUpdate>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
