// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use mealplan_sync::db::{MealCacheStore, SqliteMealCache};
use mealplan_sync::sync::{MealPlanUpdate, SyncCoordinator, SyncPolicy, SyncRequest, SyncState};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::*;

fn coordinator(remote: Arc<FakeRemote>) -> (SyncCoordinator, Arc<SqliteMealCache>) {
    let (session, _) = logged_in_gate();
    let cache = test_cache();
    let repo = test_repository(SyncPolicy::CacheFirst, session, remote, cache.clone());
    (SyncCoordinator::new(repo), cache)
}

async fn wait_for_calls(remote: &FakeRemote, calls: usize) {
    while remote.calls() < calls {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn is_terminal(state: &SyncState<MealPlanUpdate>) -> bool {
    !state.is_loading()
}

#[tokio::test(start_paused = true)]
async fn test_latest_request_wins() {
    let remote = FakeRemote::new();
    remote.push(
        Duration::from_secs(10),
        Ok(payload(&[("lunch", "Stale Soup", "200", &["leek"])])),
    );
    remote.push(Duration::from_secs(1), Ok(oats_payload()));
    let (coord, cache) = coordinator(remote.clone());

    let first = coord.request("home", SyncRequest::all());
    wait_for_calls(&remote, 1).await;
    let second = coord.request("home", SyncRequest::all());
    assert!(second.generation() > first.generation());

    let superseded = collect(first).await;
    assert!(superseded.iter().all(|s| !is_terminal(s)));

    let latest = collect(second).await;
    assert_eq!(
        latest,
        vec![
            SyncState::Loading,
            SyncState::Success(MealPlanUpdate::Items(vec![oats_item()]))
        ]
    );

    // Well past the superseded fetch's delay: it never wrote.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(cache.all().await.unwrap(), vec![oats_item()]);
    assert_eq!(coord.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_subscription_cancels_sync() {
    let remote = FakeRemote::new();
    remote.push(Duration::from_secs(10), Ok(oats_payload()));
    let (coord, cache) = coordinator(remote.clone());

    let subscription = coord.request("home", SyncRequest::all());
    wait_for_calls(&remote, 1).await;
    assert!(coord.is_in_flight("home"));

    drop(subscription);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!coord.is_in_flight("home"));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(cache.count().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_ends_subscription_without_terminal_state() {
    let remote = FakeRemote::new();
    remote.push(Duration::from_secs(10), Ok(oats_payload()));
    let (coord, _cache) = coordinator(remote.clone());

    let subscription = coord.request("home", SyncRequest::all());
    wait_for_calls(&remote, 1).await;

    assert!(coord.cancel("home"));
    assert!(!coord.cancel("home"));

    let states = collect(subscription).await;
    assert!(states.iter().all(|s| !is_terminal(s)));
}

#[tokio::test]
async fn test_consumers_are_independent() {
    let remote = FakeRemote::new();
    remote.push(Duration::ZERO, Ok(oats_payload()));
    let (coord, _cache) = coordinator(remote.clone());

    let breakfast = coord.request("breakfast-tab", SyncRequest::for_slot("breakfast"));
    let dinner = coord.request("dinner-tab", SyncRequest::for_slot("dinner"));
    assert_eq!(breakfast.consumer(), "breakfast-tab");

    let (breakfast, dinner) = tokio::join!(collect(breakfast), collect(dinner));

    assert!(breakfast.last().is_some_and(|s| s.is_success()));
    assert!(dinner.last().is_some_and(|s| s.is_success()));
    assert_eq!(remote.calls(), 2);
    assert_eq!(coord.in_flight(), 0);
}

#[tokio::test]
async fn test_invalid_session_through_coordinator() {
    let (session, _) = logged_out_gate();
    let remote = FakeRemote::new();
    let repo = test_repository(SyncPolicy::RemoteFirst, session, remote.clone(), test_cache());
    let coord = SyncCoordinator::new(repo);

    let states = collect(coord.request("home", SyncRequest::all())).await;

    assert_eq!(states.len(), 2);
    assert!(states[1].error().is_some_and(|e| e.requires_reauth()));
    assert_eq!(remote.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_coordinator_aborts_syncs() {
    let remote = FakeRemote::new();
    remote.push(Duration::from_secs(10), Ok(oats_payload()));
    let (coord, cache) = coordinator(remote.clone());

    let subscription = coord.request("home", SyncRequest::all());
    wait_for_calls(&remote, 1).await;
    drop(coord);

    let states = collect(subscription).await;
    assert!(states.iter().all(|s| !is_terminal(s)));
    assert_eq!(cache.count().await.unwrap(), 0);
}
