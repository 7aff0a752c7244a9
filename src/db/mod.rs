// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local meal-plan cache (SQLite).

pub mod sqlite;

pub use sqlite::SqliteMealCache;

use crate::error::Result;
use crate::models::MealItem;
use async_trait::async_trait;

/// Table names as constants.
pub mod tables {
    pub const MEAL_PLANS: &str = "meal_plans";
}

/// Persisted table of meal items.
///
/// Only the sync repository writes; reads may run concurrently.
#[async_trait]
pub trait MealCacheStore: Send + Sync {
    /// All rows in insertion order.
    async fn all(&self) -> Result<Vec<MealItem>>;

    /// Rows whose meal slot equals `slot`, in insertion order.
    async fn by_slot(&self, slot: &str) -> Result<Vec<MealItem>>;

    /// Delete every row.
    async fn clear(&self) -> Result<()>;

    /// Bulk insert, replacing on conflict.
    async fn insert_all(&self, items: Vec<MealItem>) -> Result<()>;

    /// Delete every row and insert `items` as one transaction.
    async fn replace_all(&self, items: Vec<MealItem>) -> Result<()>;

    /// Rows for an optional slot.
    async fn select(&self, slot: Option<&str>) -> Result<Vec<MealItem>> {
        match slot {
            Some(slot) => self.by_slot(slot).await,
            None => self.all().await,
        }
    }
}
