// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures_util::{Stream, StreamExt};
use mealplan_sync::db::{MealCacheStore, SqliteMealCache};
use mealplan_sync::error::FetchFailure;
use mealplan_sync::models::meal::{ParsedMealPlan, RawMealItem};
use mealplan_sync::models::{MealItem, RawMealPlanPayload};
use mealplan_sync::services::{MemoryCredentialStore, RemoteSource, SessionGate};
use mealplan_sync::sync::{MealPlanRepository, SyncPolicy};
use mealplan_sync::time_utils::FixedClock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_TOKEN: &str = "test-id-token";

/// Build a wire payload from `(meal, dish, calories, ingredients)` tuples.
#[allow(dead_code)]
pub fn payload(items: &[(&str, &str, &str, &[&str])]) -> RawMealPlanPayload {
    let meal_plan = items
        .iter()
        .map(|(meal, dish, calories, ingredients)| RawMealItem {
            meal: Some(meal.to_string()),
            dish_name: Some(dish.to_string()),
            calories: Some(calories.to_string()),
            ingredients: Some(ingredients.iter().map(|i| Some(i.to_string())).collect()),
        })
        .collect();

    RawMealPlanPayload {
        meal_plans: Some(vec![ParsedMealPlan {
            meal_plan: Some(meal_plan),
        }]),
    }
}

/// The canonical one-item payload: breakfast Oats with milk.
#[allow(dead_code)]
pub fn oats_payload() -> RawMealPlanPayload {
    payload(&[("breakfast", "Oats", "150", &["oats", "milk"])])
}

#[allow(dead_code)]
pub fn oats_item() -> MealItem {
    MealItem::new("breakfast", "Oats", "150", vec!["oats".into(), "milk".into()])
}

/// One scripted remote response.
#[allow(dead_code)]
struct Step {
    delay: Duration,
    result: Result<RawMealPlanPayload, FetchFailure>,
}

/// Scripted [`RemoteSource`]. Ignores its timeout budget so callers' own bounds are exercised.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeRemote {
    script: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    tokens: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Remote answering `result` once.
    pub fn returning(result: Result<RawMealPlanPayload, FetchFailure>) -> Arc<Self> {
        let remote = Self::new();
        remote.push(Duration::ZERO, result);
        remote
    }

    /// Queue a response. Calls past the end of the script return an empty payload.
    pub fn push(&self, delay: Duration, result: Result<RawMealPlanPayload, FetchFailure>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Step { delay, result });
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn fetch_meal_plan(
        &self,
        bearer_token: &str,
        _timeout: Duration,
    ) -> Result<RawMealPlanPayload, FetchFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(bearer_token.to_string());

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(step) => {
                if !step.delay.is_zero() {
                    tokio::time::sleep(step.delay).await;
                }
                step.result
            }
            None => Ok(RawMealPlanPayload::default()),
        }
    }
}

/// Session gate on a fixed clock, logged in for an hour.
#[allow(dead_code)]
pub fn logged_in_gate() -> (Arc<SessionGate>, Arc<FixedClock>) {
    let (gate, clock) = logged_out_gate();
    gate.save(TEST_TOKEN, "test-refresh-token", 3600).unwrap();
    (gate, clock)
}

#[allow(dead_code)]
pub fn logged_out_gate() -> (Arc<SessionGate>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
    ));
    let gate = SessionGate::new(Arc::new(MemoryCredentialStore::default()), clock.clone())
        .expect("memory store never fails");
    (Arc::new(gate), clock)
}

/// Fresh in-memory cache.
#[allow(dead_code)]
pub fn test_cache() -> Arc<SqliteMealCache> {
    Arc::new(SqliteMealCache::open_in_memory().expect("Failed to open in-memory cache"))
}

/// Cache pre-filled with `items`.
#[allow(dead_code)]
pub async fn seeded_cache(items: Vec<MealItem>) -> Arc<SqliteMealCache> {
    let cache = test_cache();
    cache.insert_all(items).await.unwrap();
    cache
}

#[allow(dead_code)]
pub fn test_repository(
    policy: SyncPolicy,
    session: Arc<SessionGate>,
    remote: Arc<FakeRemote>,
    cache: Arc<SqliteMealCache>,
) -> MealPlanRepository {
    MealPlanRepository::new(session, remote, cache, policy)
}

/// Drain a state stream to completion.
#[allow(dead_code)]
pub async fn collect<S: Stream + Unpin>(stream: S) -> Vec<S::Item> {
    stream.collect().await
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
