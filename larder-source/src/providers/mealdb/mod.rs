//! TheMealDB provider implementation
//!
//! HTTP client for the public TheMealDB JSON API and the conversion of its
//! flat meal records into [`Recipe`](larder_core::Recipe) values.

pub mod client;
pub mod types;

pub use client::{MealDbClient, MEALDB_BASE_URL};
pub use types::{MealEnvelope, WireMeal, INGREDIENT_SLOTS};
