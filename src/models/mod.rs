// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod auth;
pub mod health;
pub mod meal;
pub mod session;

pub use auth::{AuthResponse, LoginRequest, LogoutRequest, RegisterRequest};
pub use health::{HealthDataRequest, HealthDataResponse};
pub use meal::{MealItem, RawMealPlanPayload};
pub use session::Session;
