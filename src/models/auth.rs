// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request/response bodies for the authentication endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /logout`.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutRequest {
    #[serde(rename = "idToken")]
    pub id_token: String,
}

/// Response of login and register.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "idToken")]
    pub id_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    /// Lifetime in seconds, string-encoded by the service
    #[serde(rename = "expiresIn")]
    pub expires_in: String,
}

impl AuthResponse {
    pub fn expires_in_secs(&self) -> Option<i64> {
        self.expires_in.trim().parse().ok()
    }
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("message", &self.message)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}
