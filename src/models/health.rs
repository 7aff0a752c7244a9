// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health metrics submission and the model-derived prediction.

use serde::{Deserialize, Serialize};

/// Body of `POST /healthData`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthDataRequest {
    pub age: String,
    pub gender: String,
    pub weight_kg: String,
    pub height_cm: String,
    #[serde(default)]
    pub food_allergies: Vec<String>,
}

/// Response of `POST /healthData` and `GET /predict`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthDataResponse {
    pub predicted_bmr: f64,
    pub weight_category: String,
    #[serde(default)]
    pub recommended_calories: Option<f64>,
}
