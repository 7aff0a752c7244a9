// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - API transport, session and account logic.

pub mod api;
pub mod auth;
pub mod health;
pub mod remote;
pub mod session;

pub use api::ApiClient;
pub use auth::AuthService;
pub use health::HealthService;
pub use remote::RemoteSource;
pub use session::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionGate, SessionStatus,
};
