// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use mealplan_sync::config::Config;
use mealplan_sync::db::MealCacheStore;
use mealplan_sync::sync::SyncPolicy;
use mealplan_sync::AppState;
use std::time::Duration;

mod common;
use common::oats_item;

fn config_in(dir: &tempfile::TempDir) -> Config {
    Config {
        cache_db_path: dir.path().join("cache.sqlite3"),
        credentials_path: dir.path().join("credentials.json"),
        sync_timeout: Duration::from_secs(5),
        sync_policy: SyncPolicy::CacheFirst,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_build_wires_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::build(config_in(&dir)).unwrap();

    assert_eq!(state.repository.policy(), SyncPolicy::CacheFirst);
    assert_eq!(state.repository.timeout(), Duration::from_secs(5));
    assert!(!state.session.is_valid());
    assert_eq!(state.coordinator.in_flight(), 0);
}

#[tokio::test]
async fn test_session_and_cache_survive_rebuild() {
    let dir = tempfile::tempdir().unwrap();

    {
        let state = AppState::build(config_in(&dir)).unwrap();
        state.session.save("persisted-id", "persisted-refresh", 3600).unwrap();
        state.cache.insert_all(vec![oats_item()]).await.unwrap();
    }

    let state = AppState::build(config_in(&dir)).unwrap();
    assert!(state.session.is_valid());
    assert_eq!(state.session.token().as_deref(), Some("persisted-id"));
    assert_eq!(state.cache.all().await.unwrap(), vec![oats_item()]);
}
