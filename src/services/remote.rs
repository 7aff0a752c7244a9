// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote source seam used by the sync repository.

use crate::error::FetchFailure;
use crate::models::RawMealPlanPayload;
use async_trait::async_trait;
use std::time::Duration;

/// Fetches the meal plan for the current session.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the raw meal plan.
    ///
    /// Implementations must give up after `timeout` with [`FetchFailure::Timeout`]
    /// and must not keep working on the abandoned call.
    async fn fetch_meal_plan(
        &self,
        bearer_token: &str,
        timeout: Duration,
    ) -> Result<RawMealPlanPayload, FetchFailure>;
}
