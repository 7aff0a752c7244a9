// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health metrics and BMR prediction, behind the session gate.

use super::api::ApiClient;
use super::session::SessionGate;
use crate::error::{FetchFailure, SyncError};
use crate::models::{HealthDataRequest, HealthDataResponse};
use std::sync::Arc;

#[derive(Clone)]
pub struct HealthService {
    api: ApiClient,
    session: Arc<SessionGate>,
}

impl HealthService {
    pub fn new(api: ApiClient, session: Arc<SessionGate>) -> Self {
        Self { api, session }
    }

    /// Submit the user's metrics and return the refreshed prediction.
    pub async fn submit_health_data(
        &self,
        request: &HealthDataRequest,
    ) -> Result<HealthDataResponse, SyncError> {
        let token = self.session.authorize()?;
        let result = self.api.send_health_data(&token, request).await;
        self.settle(result)
    }

    /// Fetch the latest prediction.
    pub async fn prediction(&self) -> Result<HealthDataResponse, SyncError> {
        let token = self.session.authorize()?;
        let result = self.api.get_prediction(&token).await;
        self.settle(result)
    }

    fn settle(
        &self,
        result: Result<HealthDataResponse, FetchFailure>,
    ) -> Result<HealthDataResponse, SyncError> {
        result.map_err(|failure| {
            self.session.invalidate_on(&failure);
            failure.into()
        })
    }
}
