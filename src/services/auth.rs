// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, registration and logout on top of the session gate.

use super::api::ApiClient;
use super::session::SessionGate;
use crate::db::MealCacheStore;
use crate::error::{FetchFailure, SyncError};
use crate::models::{AuthResponse, LoginRequest, LogoutRequest, RegisterRequest};
use std::sync::Arc;

/// Establishes and tears down the user's session.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: Arc<SessionGate>,
    cache: Arc<dyn MealCacheStore>,
}

impl AuthService {
    pub fn new(api: ApiClient, session: Arc<SessionGate>, cache: Arc<dyn MealCacheStore>) -> Self {
        Self {
            api,
            session,
            cache,
        }
    }

    /// Log in and persist the issued session. Returns the service's greeting.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, SyncError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.api.login(&request).await?;
        self.establish(response)
    }

    /// Create an account and persist the session it comes with.
    pub async fn register(&self, email: &str, password: &str) -> Result<String, SyncError> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.api.register(&request).await?;
        self.establish(response)
    }

    fn establish(&self, response: AuthResponse) -> Result<String, SyncError> {
        let expires_in = response.expires_in_secs().ok_or_else(|| {
            SyncError::from(FetchFailure::Malformed(format!(
                "expiresIn is not a number: {:?}",
                response.expires_in
            )))
        })?;

        self.session
            .save(&response.id_token, &response.refresh_token, expires_in)?;
        tracing::info!(expires_in, "Logged in");
        Ok(response.message)
    }

    /// Log out. The server call is best-effort; local state is always cleared.
    pub async fn logout(&self) -> Result<(), SyncError> {
        if let Some(token) = self.session.token() {
            let request = LogoutRequest {
                id_token: token.clone(),
            };
            if let Err(e) = self.api.logout(&token, &request).await {
                tracing::warn!(error = %e, "Server-side logout failed, clearing locally");
            }
        }

        let session_result = self.session.clear();
        let cache_result = self.cache.clear().await;
        session_result?;
        cache_result?;

        tracing::info!("Logged out");
        Ok(())
    }
}
