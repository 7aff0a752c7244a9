// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use crate::sync::SyncPolicy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Remote call budget observed for the meal-plan endpoint.
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 35;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_HTTP_MAX_RETRIES: u32 = 3;

/// Client configuration, loaded once by the host application.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the health/nutrition API
    pub api_base_url: String,
    /// Upper bound on one meal-plan fetch, retries included
    pub sync_timeout: Duration,
    /// Per-request transport timeout
    pub http_timeout: Duration,
    /// Attempts per request on transport-level failures
    pub http_max_retries: u32,
    /// SQLite file backing the meal-plan cache
    pub cache_db_path: PathBuf,
    /// JSON file holding the persisted session
    pub credentials_path: PathBuf,
    /// Orchestration strategy for meal-plan sync
    pub sync_policy: SyncPolicy,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            sync_timeout: Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            http_max_retries: DEFAULT_HTTP_MAX_RETRIES,
            cache_db_path: PathBuf::from("mealplan_cache.sqlite3"),
            credentials_path: PathBuf::from("credentials.json"),
            sync_policy: SyncPolicy::RemoteFirst,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let sync_policy = match env::var("MEALPLAN_SYNC_POLICY") {
            Ok(name) => name
                .parse()
                .map_err(|_| ConfigError::Invalid("MEALPLAN_SYNC_POLICY", name))?,
            Err(_) => SyncPolicy::RemoteFirst,
        };

        Ok(Self {
            api_base_url: env::var("MEALPLAN_API_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("MEALPLAN_API_BASE_URL"))?,
            sync_timeout: Duration::from_secs(parse_or(
                "MEALPLAN_SYNC_TIMEOUT_SECS",
                DEFAULT_SYNC_TIMEOUT_SECS,
            )),
            http_timeout: Duration::from_secs(parse_or(
                "MEALPLAN_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            http_max_retries: parse_or("MEALPLAN_HTTP_MAX_RETRIES", DEFAULT_HTTP_MAX_RETRIES)
                .max(1),
            cache_db_path: env::var("MEALPLAN_CACHE_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("mealplan_cache.sqlite3")),
            credentials_path: env::var("MEALPLAN_CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("credentials.json")),
            sync_policy,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so env mutations don't race across test threads.
    #[test]
    fn test_config_from_env() {
        env::set_var("MEALPLAN_API_BASE_URL", "https://api.example.test/");
        env::set_var("MEALPLAN_SYNC_TIMEOUT_SECS", "not-a-number");
        env::set_var("MEALPLAN_HTTP_MAX_RETRIES", "5");
        env::set_var("MEALPLAN_SYNC_POLICY", "cache_first");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "https://api.example.test");
        assert_eq!(config.sync_timeout, Duration::from_secs(35));
        assert_eq!(config.http_max_retries, 5);
        assert_eq!(config.sync_policy, SyncPolicy::CacheFirst);

        env::set_var("MEALPLAN_SYNC_POLICY", "sometimes");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("MEALPLAN_SYNC_POLICY", _)));

        env::remove_var("MEALPLAN_SYNC_POLICY");
        env::remove_var("MEALPLAN_API_BASE_URL");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MEALPLAN_API_BASE_URL")));

        env::remove_var("MEALPLAN_SYNC_TIMEOUT_SECS");
        env::remove_var("MEALPLAN_HTTP_MAX_RETRIES");
    }
}
