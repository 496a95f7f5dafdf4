//! Larder Core - Entity Types
//!
//! Recipe data, week plans, the shopping aggregation transform and the
//! shared error taxonomy. Every other crate in the workspace depends on this.

pub mod error;
pub mod plan;
pub mod recipe;

pub use error::{
    ErrorKind, LarderError, LarderResult, SourceError, StorageError, ValidationError,
};
pub use plan::{aggregate_ingredients, DayMeal, MealSlot, ShoppingItem, WeekPlan, WEEKDAYS};
pub use recipe::{Ingredient, Recipe, RecipeId};
