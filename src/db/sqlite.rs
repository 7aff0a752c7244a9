// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite-backed meal-plan cache.
//!
//! One table, `meal_plans`, with a surrogate autoincrement id. Ingredients are
//! stored as a single delimited column. Blocking SQLite calls run on the
//! blocking pool behind a mutex.

use super::{tables, MealCacheStore};
use crate::error::{AppError, Result};
use crate::models::meal::{decode_ingredients, MealItem};
use async_trait::async_trait;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA_VERSION: i64 = 1;

/// SQLite meal-plan cache. Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct SqliteMealCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMealCache {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "Opened meal-plan cache");
        Self::with_connection(conn)
    }

    /// Open a private in-memory cache.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of cached rows.
    pub async fn count(&self) -> Result<usize> {
        self.run(|conn| {
            let sql = format!("SELECT COUNT(*) FROM {}", tables::MEAL_PLANS);
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    /// Run a closure against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut guard)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Cache task failed: {}", e)))?
        .map_err(AppError::from)
    }
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < SCHEMA_VERSION {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                meal TEXT,
                dish_name TEXT,
                calories TEXT,
                ingredients TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_meal_plans_meal ON {table}(meal);
            PRAGMA user_version = {version};",
            table = tables::MEAL_PLANS,
            version = SCHEMA_VERSION,
        ))?;
    }

    Ok(())
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<MealItem> {
    let meal: Option<String> = row.get(0)?;
    let dish_name: Option<String> = row.get(1)?;
    let calories: Option<String> = row.get(2)?;
    let ingredients: Option<String> = row.get(3)?;

    Ok(MealItem {
        meal_slot: meal.unwrap_or_default(),
        dish_name: dish_name.unwrap_or_default(),
        calories: calories.unwrap_or_default(),
        ingredients: ingredients
            .as_deref()
            .map(decode_ingredients)
            .unwrap_or_default(),
    })
}

fn insert_rows(conn: &Connection, items: &[MealItem]) -> rusqlite::Result<()> {
    let sql = format!(
        "INSERT OR REPLACE INTO {} (meal, dish_name, calories, ingredients)
         VALUES (?1, ?2, ?3, ?4)",
        tables::MEAL_PLANS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    for item in items {
        stmt.execute(params![
            item.meal_slot,
            item.dish_name,
            item.calories,
            item.encoded_ingredients()
        ])?;
    }
    Ok(())
}

#[async_trait]
impl MealCacheStore for SqliteMealCache {
    async fn all(&self) -> Result<Vec<MealItem>> {
        self.run(|conn| {
            let sql = format!(
                "SELECT meal, dish_name, calories, ingredients FROM {} ORDER BY id",
                tables::MEAL_PLANS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_item)?;
            rows.collect()
        })
        .await
    }

    async fn by_slot(&self, slot: &str) -> Result<Vec<MealItem>> {
        let slot = slot.to_string();
        self.run(move |conn| {
            let sql = format!(
                "SELECT meal, dish_name, calories, ingredients FROM {}
                 WHERE meal = ?1 ORDER BY id",
                tables::MEAL_PLANS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![slot], row_to_item)?;
            rows.collect()
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        let deleted = self
            .run(|conn| conn.execute(&format!("DELETE FROM {}", tables::MEAL_PLANS), []))
            .await?;
        tracing::debug!(deleted, "Cleared meal-plan cache");
        Ok(())
    }

    async fn insert_all(&self, items: Vec<MealItem>) -> Result<()> {
        let count = items.len();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            insert_rows(&tx, &items)?;
            tx.commit()
        })
        .await?;
        tracing::debug!(count, "Inserted meal-plan rows");
        Ok(())
    }

    async fn replace_all(&self, items: Vec<MealItem>) -> Result<()> {
        let count = items.len();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(&format!("DELETE FROM {}", tables::MEAL_PLANS), [])?;
            insert_rows(&tx, &items)?;
            tx.commit()
        })
        .await?;
        tracing::debug!(count, "Replaced meal-plan cache");
        Ok(())
    }
}
