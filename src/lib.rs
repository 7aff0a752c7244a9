// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mealplan-Sync: offline-first meal-plan synchronization
//!
//! This crate provides the client core of a health and nutrition app: a
//! session gate over the API's bearer token, a SQLite cache of the user's
//! meal plan, and a repository that reconciles the two and reports progress
//! as a stream of [`sync::SyncState`] values.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod sync;
pub mod time_utils;

use config::Config;
use db::{MealCacheStore, SqliteMealCache};
use error::Result;
use services::{ApiClient, AuthService, FileCredentialStore, HealthService, SessionGate};
use std::sync::Arc;
use sync::{MealPlanRepository, SyncCoordinator};
use time_utils::SystemClock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionGate>,
    pub api: ApiClient,
    pub cache: Arc<dyn MealCacheStore>,
    pub repository: MealPlanRepository,
    pub coordinator: Arc<SyncCoordinator>,
    pub auth_service: AuthService,
    pub health_service: HealthService,
}

impl AppState {
    /// Wire every collaborator from `config`, restoring any persisted session.
    pub fn build(config: Config) -> Result<Self> {
        let store = Arc::new(FileCredentialStore::new(&config.credentials_path));
        let session = Arc::new(SessionGate::new(store, Arc::new(SystemClock))?);

        let api = ApiClient::from_config(&config)?;

        let cache: Arc<dyn MealCacheStore> = Arc::new(SqliteMealCache::open(&config.cache_db_path)?);
        tracing::info!(path = %config.cache_db_path.display(), "Meal-plan cache opened");

        let repository = MealPlanRepository::new(
            session.clone(),
            Arc::new(api.clone()),
            cache.clone(),
            config.sync_policy,
        )
        .with_timeout(config.sync_timeout);
        tracing::info!(
            policy = ?config.sync_policy,
            timeout_secs = config.sync_timeout.as_secs(),
            "Meal-plan repository initialized"
        );

        let coordinator = Arc::new(SyncCoordinator::new(repository.clone()));
        let auth_service = AuthService::new(api.clone(), session.clone(), cache.clone());
        let health_service = HealthService::new(api.clone(), session.clone());

        Ok(Self {
            config,
            session,
            api,
            cache,
            repository,
            coordinator,
            auth_service,
            health_service,
        })
    }
}
