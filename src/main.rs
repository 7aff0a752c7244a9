// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mealplan-Sync command line
//!
//! Runs one meal-plan sync against the configured API and prints the result.
//!
//! Usage: `mealplan-sync [MEAL_SLOT] [--allergies milk,egg]`

use futures_util::StreamExt;
use mealplan_sync::{
    config::Config,
    models::MealItem,
    sync::{AllergyFilter, MealPlanUpdate, SyncRequest, SyncState},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    mealplan_sync::logging::init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(base_url = %config.api_base_url, "Starting meal-plan sync");

    let request = parse_args(std::env::args().skip(1))?;
    let state = AppState::build(config)?;

    let mut states = state.coordinator.request("cli", request.clone());
    while let Some(update) = states.next().await {
        match update {
            SyncState::Loading => tracing::info!("Syncing meal plan"),
            SyncState::Success(MealPlanUpdate::Items(items)) => print_items(&items),
            SyncState::Success(MealPlanUpdate::CacheRefreshed) => {
                let items = state
                    .repository
                    .cached(request.meal_slot.as_deref(), &request.allergies)
                    .await?;
                print_items(&items);
            }
            SyncState::Error(e) => {
                if e.requires_reauth() {
                    eprintln!("{e}: log in and try again");
                } else {
                    eprintln!("{e}");
                }
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<SyncRequest, String> {
    let mut request = SyncRequest::all();
    while let Some(arg) = args.next() {
        if arg == "--allergies" {
            let list = args.next().ok_or("--allergies needs a value")?;
            request = request.with_allergies(AllergyFilter::parse_list(&list));
        } else if arg.starts_with("--") {
            return Err(format!("unknown option {arg}"));
        } else {
            request.meal_slot = Some(arg);
        }
    }
    Ok(request)
}

fn print_items(items: &[MealItem]) {
    if items.is_empty() {
        println!("No meal plans.");
    }
    for item in items {
        println!(
            "{:<10} {:<30} {:>6} kcal  {}",
            item.meal_slot,
            item.dish_name,
            item.calories,
            item.ingredients.join(", ")
        );
    }
}
