// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the health/nutrition API.
//!
//! Handles:
//! - Login, registration and logout
//! - Health data submission and prediction retrieval
//! - Meal-plan fetching (the [`RemoteSource`] used by sync)
//! - Status classification into [`FetchFailure`]
//! - Immediate retries on transport-level failures (never on HTTP statuses)

use super::remote::RemoteSource;
use crate::config::Config;
use crate::error::{AppError, FetchFailure};
use crate::models::{
    AuthResponse, HealthDataRequest, HealthDataResponse, LoginRequest, LogoutRequest,
    RawMealPlanPayload, RegisterRequest,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Endpoint paths.
pub mod endpoints {
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const LOGOUT: &str = "/logout";
    pub const HEALTH_DATA: &str = "/healthData";
    pub const PREDICT: &str = "/predict";
    pub const MEAL_PLAN: &str = "/mealPlan";
}

/// Health/nutrition API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// `request_timeout` bounds each HTTP attempt; `max_retries` is the total
    /// number of attempts made when the transport fails.
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: max_retries.max(1),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.api_base_url.clone(),
            config.http_timeout,
            config.http_max_retries,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticate with email and password.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, FetchFailure> {
        let url = self.url(endpoints::LOGIN);
        let response = self
            .send_with_retry(|| self.http.post(&url).json(request))
            .await?;
        check_response_json(response).await
    }

    /// Create an account; the service logs the new user in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, FetchFailure> {
        let url = self.url(endpoints::REGISTER);
        let response = self
            .send_with_retry(|| self.http.post(&url).json(request))
            .await?;
        check_response_json(response).await
    }

    /// Revoke the session server-side.
    pub async fn logout(&self, bearer_token: &str, request: &LogoutRequest) -> Result<(), FetchFailure> {
        let url = self.url(endpoints::LOGOUT);
        let response = self
            .send_with_retry(|| self.http.post(&url).bearer_auth(bearer_token).json(request))
            .await?;
        check_response(response).await
    }

    /// Submit health metrics; the service answers with a fresh prediction.
    pub async fn send_health_data(
        &self,
        bearer_token: &str,
        request: &HealthDataRequest,
    ) -> Result<HealthDataResponse, FetchFailure> {
        let url = self.url(endpoints::HEALTH_DATA);
        let response = self
            .send_with_retry(|| self.http.post(&url).bearer_auth(bearer_token).json(request))
            .await?;
        check_response_json(response).await
    }

    /// Latest model-derived prediction for the user.
    pub async fn get_prediction(&self, bearer_token: &str) -> Result<HealthDataResponse, FetchFailure> {
        self.get_json(endpoints::PREDICT, bearer_token).await
    }

    /// Meal plan generated for the user.
    pub async fn get_meal_plan(&self, bearer_token: &str) -> Result<RawMealPlanPayload, FetchFailure> {
        self.get_json(endpoints::MEAL_PLAN, bearer_token).await
    }

    /// Generic authenticated GET with JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer_token: &str,
    ) -> Result<T, FetchFailure> {
        let url = self.url(path);
        let response = self
            .send_with_retry(|| self.http.get(&url).bearer_auth(bearer_token))
            .await?;
        check_response_json(response).await
    }

    /// Send a request, retrying immediately while the transport itself fails.
    ///
    /// HTTP error statuses are returned as-is for classification.
    async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response, FetchFailure>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    let failure = FetchFailure::from_transport(&e);
                    if !failure.is_transient_transport() || attempt >= self.max_retries {
                        tracing::warn!(attempt, error = %e, "API request failed");
                        return Err(failure);
                    }
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_retries,
                        error = %e,
                        "API transport error, retrying"
                    );
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl RemoteSource for ApiClient {
    async fn fetch_meal_plan(
        &self,
        bearer_token: &str,
        timeout: Duration,
    ) -> Result<RawMealPlanPayload, FetchFailure> {
        // Dropping the inner future on expiry abandons the connection and any pending retry.
        match tokio::time::timeout(timeout, self.get_meal_plan(bearer_token)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_secs = timeout.as_secs(), "Meal plan fetch timed out");
                Err(FetchFailure::Timeout)
            }
        }
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<(), FetchFailure> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(failure_from(response).await)
}

/// Check response and parse JSON body.
async fn check_response_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, FetchFailure> {
    if !response.status().is_success() {
        return Err(failure_from(response).await);
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchFailure::from_transport(&e))?;

    serde_json::from_slice(&bytes).map_err(|e| FetchFailure::Malformed(e.to_string()))
}

/// Classify a non-success response, consuming its body for diagnostics.
async fn failure_from(response: reqwest::Response) -> FetchFailure {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    if status == 401 {
        tracing::warn!("API rejected bearer token (401)");
    }

    FetchFailure::from_status(status, body)
}
