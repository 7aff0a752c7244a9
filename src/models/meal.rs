// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal-plan items and the `/mealPlan` wire payload.

use serde::{Deserialize, Deserializer, Serialize};

/// Delimiter used to store ingredients in a single column.
pub const INGREDIENT_DELIMITER: char = ',';

/// One dish of the meal plan as stored locally and shown to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealItem {
    /// Meal slot, e.g. "breakfast"
    pub meal_slot: String,
    pub dish_name: String,
    /// String-encoded calorie count, as sent by the service
    pub calories: String,
    pub ingredients: Vec<String>,
}

impl MealItem {
    pub fn new(
        meal_slot: impl Into<String>,
        dish_name: impl Into<String>,
        calories: impl Into<String>,
        ingredients: Vec<String>,
    ) -> Self {
        Self {
            meal_slot: meal_slot.into(),
            dish_name: dish_name.into(),
            calories: calories.into(),
            ingredients,
        }
    }

    /// Item identity for list diffing: dish name only.
    ///
    /// Two different dishes sharing a name across slots compare as the same item.
    pub fn same_item(&self, other: &MealItem) -> bool {
        self.dish_name == other.dish_name
    }

    /// Ingredients joined into the storage column format.
    pub fn encoded_ingredients(&self) -> String {
        encode_ingredients(&self.ingredients)
    }
}

/// Join ingredients for storage. Lossy if an ingredient contains the delimiter.
pub fn encode_ingredients(ingredients: &[String]) -> String {
    ingredients.join(&INGREDIENT_DELIMITER.to_string())
}

/// Split a stored ingredients column back into a list.
pub fn decode_ingredients(column: &str) -> Vec<String> {
    if column.is_empty() {
        return Vec::new();
    }
    column
        .split(INGREDIENT_DELIMITER)
        .map(str::to_string)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

/// Response body of `GET /mealPlan`. Every level may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawMealPlanPayload {
    #[serde(rename = "mealPlans", default)]
    pub meal_plans: Option<Vec<ParsedMealPlan>>,
}

/// One generated plan inside the payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ParsedMealPlan {
    #[serde(rename = "mealPlan", default)]
    pub meal_plan: Option<Vec<RawMealItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawMealItem {
    #[serde(default)]
    pub meal: Option<String>,
    #[serde(rename = "dishName", default)]
    pub dish_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub calories: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<Option<String>>>,
}

impl RawMealPlanPayload {
    /// Flatten all plans into storable items. Missing strings become empty,
    /// null ingredients are dropped.
    pub fn into_items(self) -> Vec<MealItem> {
        self.meal_plans
            .unwrap_or_default()
            .into_iter()
            .flat_map(|plan| plan.meal_plan.unwrap_or_default())
            .map(RawMealItem::into_item)
            .collect()
    }
}

impl RawMealItem {
    fn into_item(self) -> MealItem {
        MealItem {
            meal_slot: self.meal.unwrap_or_default(),
            dish_name: self.dish_name.unwrap_or_default(),
            calories: self.calories.unwrap_or_default(),
            ingredients: self
                .ingredients
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .collect(),
        }
    }
}

/// Accept calories sent either as `"150"` or `150`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Calories {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Calories>::deserialize(deserializer)?.map(|c| match c {
        Calories::Text(s) => s,
        Calories::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_flattens_nested_plans() {
        let json = r#"{
            "mealPlans": [
                {"mealPlan": [
                    {"meal": "breakfast", "dishName": "Oats", "calories": "150", "ingredients": ["oats", "milk"]},
                    {"meal": "lunch", "dishName": "Rice Bowl", "calories": 420, "ingredients": ["rice", null, "egg"]}
                ]},
                {"mealPlan": null},
                {"mealPlan": [{"meal": "dinner", "dishName": null}]}
            ]
        }"#;

        let payload: RawMealPlanPayload = serde_json::from_str(json).unwrap();
        let items = payload.into_items();

        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            MealItem::new("breakfast", "Oats", "150", vec!["oats".into(), "milk".into()])
        );
        assert_eq!(items[1].calories, "420");
        assert_eq!(items[1].ingredients, vec!["rice", "egg"]);
        assert_eq!(items[2].dish_name, "");
        assert!(items[2].ingredients.is_empty());
    }

    #[test]
    fn test_empty_payload_yields_no_items() {
        let payload: RawMealPlanPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.into_items().is_empty());
    }

    #[test]
    fn test_ingredient_encoding_is_lossy_on_delimiter() {
        let original = vec!["salt, pepper".to_string(), "oil".to_string()];
        let decoded = decode_ingredients(&encode_ingredients(&original));
        assert_eq!(decoded, vec!["salt", " pepper", "oil"]);
        assert!(decode_ingredients("").is_empty());
    }

    #[test]
    fn test_same_item_ignores_slot_and_calories() {
        let a = MealItem::new("breakfast", "Omelette", "200", vec![]);
        let b = MealItem::new("dinner", "Omelette", "350", vec!["egg".into()]);
        assert!(a.same_item(&b));
        assert_ne!(a, b);
    }
}
