// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side allergy filtering of meal items.

use crate::models::MealItem;

/// Case-insensitive substring filter over dish names and ingredients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllergyFilter {
    /// Lower-cased, trimmed, non-blank terms.
    terms: Vec<String>,
}

impl AllergyFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    /// Parse a comma-separated allergy list as typed by the user.
    pub fn parse_list(text: &str) -> Self {
        Self::new(text.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// True if the dish name or any ingredient contains any term.
    pub fn excludes(&self, item: &MealItem) -> bool {
        if self.terms.is_empty() {
            return false;
        }
        let dish = item.dish_name.to_lowercase();
        let ingredients: Vec<String> = item.ingredients.iter().map(|i| i.to_lowercase()).collect();

        self.terms.iter().any(|term| {
            dish.contains(term.as_str()) || ingredients.iter().any(|i| i.contains(term.as_str()))
        })
    }

    /// Items not excluded, in their original order.
    pub fn apply(&self, items: &[MealItem]) -> Vec<MealItem> {
        items
            .iter()
            .filter(|item| !self.excludes(item))
            .cloned()
            .collect()
    }
}
