//! Larder Test Utilities
//!
//! Centralized test infrastructure for the Larder workspace:
//! - A scriptable mock remote source
//! - Proptest generators for recipes
//! - Test fixtures for common scenarios
//! - Custom assertions for Larder-specific validation

// Re-export core types for convenience
pub use larder_core::{
    Ingredient, LarderError, LarderResult, MealSlot, Recipe, ShoppingItem, SourceError, WeekPlan,
};
pub use larder_source::{RemoteSource, SourceResult};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

// ============================================================================
// MOCK REMOTE SOURCE
// ============================================================================

/// Name reported by [`MockRemoteSource`].
pub const MOCK_PROVIDER: &str = "mock";

/// In-memory remote source with call counters, delays and failure injection.
#[derive(Debug, Default)]
pub struct MockRemoteSource {
    recipes: RwLock<HashMap<String, Recipe>>,
    search_results: RwLock<HashMap<String, Vec<Recipe>>>,
    random: RwLock<Option<Recipe>>,
    delays: RwLock<HashMap<String, Duration>>,
    default_delay: RwLock<Duration>,
    failing: AtomicBool,
    fetch_calls: AtomicUsize,
    search_calls: AtomicUsize,
    random_calls: AtomicUsize,
    fetch_calls_by_id: RwLock<HashMap<String, usize>>,
}

impl MockRemoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `recipe` from `fetch_by_id` under its id.
    pub fn with_recipe(self, recipe: Recipe) -> Self {
        self.insert_recipe(recipe);
        self
    }

    /// Serve `recipe` from `fetch_by_id(id)` whatever its own id is.
    pub fn with_recipe_as(self, id: impl Into<String>, recipe: Recipe) -> Self {
        write(&self.recipes).insert(id.into(), recipe);
        self
    }

    /// Serve `results` from `search(term)`.
    pub fn with_search_results(self, term: impl Into<String>, results: Vec<Recipe>) -> Self {
        write(&self.search_results).insert(term.into(), results);
        self
    }

    /// Serve `recipe` from `fetch_random`.
    pub fn with_random(self, recipe: Recipe) -> Self {
        *write(&self.random) = Some(recipe);
        self
    }

    /// Delay every call that touches `id`.
    pub fn with_delay(self, id: impl Into<String>, delay: Duration) -> Self {
        write(&self.delays).insert(id.into(), delay);
        self
    }

    /// Delay every call that has no per-id delay.
    pub fn with_default_delay(self, delay: Duration) -> Self {
        *write(&self.default_delay) = delay;
        self
    }

    /// Start out failing every call.
    pub fn failing(self) -> Self {
        self.set_failing(true);
        self
    }

    pub fn insert_recipe(&self, recipe: Recipe) {
        write(&self.recipes).insert(recipe.id.clone(), recipe);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total `fetch_by_id` calls.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// `fetch_by_id` calls for one id.
    pub fn fetch_calls_for(&self, id: &str) -> usize {
        read(&self.fetch_calls_by_id).get(id).copied().unwrap_or(0)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn random_calls(&self) -> usize {
        self.random_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self, key: &str) {
        let delay = read(&self.delays)
            .get(key)
            .copied()
            .unwrap_or_else(|| *read(&self.default_delay));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_failing(&self, operation: &str) -> SourceResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::RemoteUnavailable {
                provider: MOCK_PROVIDER.to_string(),
                reason: format!("injected {} failure", operation),
            });
        }
        Ok(())
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl RemoteSource for MockRemoteSource {
    fn name(&self) -> &str {
        MOCK_PROVIDER
    }

    async fn fetch_by_id(&self, id: &str) -> SourceResult<Option<Recipe>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        *write(&self.fetch_calls_by_id).entry(id.to_string()).or_insert(0) += 1;

        self.pause(id).await;
        self.check_failing("fetch_by_id")?;
        Ok(read(&self.recipes).get(id).cloned())
    }

    async fn search(&self, term: &str) -> SourceResult<Vec<Recipe>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        self.pause(term).await;
        self.check_failing("search")?;
        Ok(read(&self.search_results)
            .get(term)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_random(&self) -> SourceResult<Option<Recipe>> {
        self.random_calls.fetch_add(1, Ordering::SeqCst);

        self.pause("").await;
        self.check_failing("fetch_random")?;
        Ok(read(&self.random).clone())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Larder types.

    use super::*;
    use proptest::prelude::*;

    /// Numeric ids shaped like the upstream catalogue.
    pub fn arb_recipe_id() -> impl Strategy<Value = String> {
        (10_000u32..99_999).prop_map(|n| n.to_string())
    }

    pub fn arb_ingredient() -> impl Strategy<Value = Ingredient> {
        (
            "[A-Za-z][A-Za-z ]{0,15}",
            prop_oneof!["[0-9]{1,3} ?(g|ml|cup|tbsp)", Just(String::new())],
        )
            .prop_map(|(name, measure)| Ingredient::new(name, measure))
    }

    /// A recipe with instructions.
    pub fn arb_recipe() -> impl Strategy<Value = Recipe> {
        (
            arb_recipe_id(),
            "[A-Z][a-z]{2,12}( [A-Z][a-z]{2,12}){0,2}",
            prop::sample::select(vec!["Beef", "Chicken", "Dessert", "Seafood", "Vegetarian"]),
            prop::sample::select(vec!["British", "Italian", "Japanese", "Mexican", ""]),
            "[A-Za-z .,]{1,60}[a-z.]",
            prop::collection::vec(arb_ingredient(), 0..=20),
        )
            .prop_map(|(id, name, category, area, instructions, ingredients)| Recipe {
                image_url: format!("https://img.example/{}.jpg", id),
                id,
                name,
                category: category.to_string(),
                area: area.to_string(),
                instructions,
                ingredients,
            })
    }

    /// A summary-only recipe as returned by search.
    pub fn arb_partial_recipe() -> impl Strategy<Value = Recipe> {
        arb_recipe().prop_map(|recipe| fixtures::partial_of(&recipe))
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built recipes for common scenarios.

    use super::*;

    /// The canonical "52772" lookup.
    pub fn teriyaki_chicken() -> Recipe {
        Recipe::new("52772", "Teriyaki Chicken Casserole")
            .with_category("Chicken")
            .with_area("Japanese")
            .with_instructions(
                "Preheat oven to 350° F. Spray a 9x13-inch baking pan with non-stick spray.\n\
                 Combine soy sauce, ½ cup water, brown sugar, ginger and garlic in a small \
                 saucepan and cover. Bring to a boil over medium heat.",
            )
            .with_image_url("https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg")
            .with_ingredient("soy sauce", "3/4 cup")
            .with_ingredient("water", "1/2 cup")
            .with_ingredient("brown sugar", "1/4 cup")
            .with_ingredient("ground ginger", "1/2 teaspoon")
            .with_ingredient("minced garlic", "1/2 teaspoon")
            .with_ingredient("cornstarch", "4 Tablespoons")
            .with_ingredient("chicken breasts", "2")
            .with_ingredient("stir-fry vegetables", "1 (12 oz.)")
            .with_ingredient("brown rice", "3 cups")
    }

    /// A complete recipe with one ingredient.
    pub fn complete_recipe(id: &str, name: &str) -> Recipe {
        Recipe::new(id, name)
            .with_category("Miscellaneous")
            .with_instructions(format!("Cook the {}.", name))
            .with_ingredient("salt", "pinch")
    }

    /// The summary-only form of `recipe`: same identity, no instructions.
    pub fn partial_of(recipe: &Recipe) -> Recipe {
        Recipe {
            instructions: String::new(),
            ..recipe.clone()
        }
    }

    /// Summary records returned for the term "chicken".
    pub fn chicken_search_results() -> Vec<Recipe> {
        vec![
            Recipe::new("52795", "Chicken Handi").with_category("Chicken"),
            Recipe::new("52796", "Chicken Alfredo Primavera").with_category("Chicken"),
            Recipe::new("52934", "Chicken Basquaise").with_category("Chicken"),
        ]
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for Larder-specific validation.

    use super::*;

    /// Assert that a recipe carries instructions.
    #[track_caller]
    pub fn assert_complete(recipe: &Recipe) {
        assert!(
            recipe.is_complete(),
            "Expected a complete recipe, got partial {:?}",
            recipe.id
        );
    }

    /// Assert that a LarderResult is a Source error.
    #[track_caller]
    pub fn assert_source_error<T: std::fmt::Debug>(result: &LarderResult<T>) {
        match result {
            Err(LarderError::Source(_)) => {}
            other => panic!("Expected Source error, got: {:?}", other),
        }
    }

    /// Assert that a LarderResult is a timed-out Source error.
    #[track_caller]
    pub fn assert_timed_out<T: std::fmt::Debug>(result: &LarderResult<T>) {
        match result {
            Err(LarderError::Source(SourceError::TimedOut { .. })) => {}
            other => panic!("Expected TimedOut error, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_counts_calls_per_id() {
        let mock = MockRemoteSource::new().with_recipe(fixtures::teriyaki_chicken());

        assert!(mock.fetch_by_id("52772").await.unwrap().is_some());
        assert!(mock.fetch_by_id("52772").await.unwrap().is_some());
        assert!(mock.fetch_by_id("1").await.unwrap().is_none());

        assert_eq!(mock.fetch_calls(), 3);
        assert_eq!(mock.fetch_calls_for("52772"), 2);
        assert_eq!(mock.fetch_calls_for("1"), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let mock = MockRemoteSource::new().failing();
        assert!(mock.search("chicken").await.is_err());

        mock.set_failing(false);
        assert!(mock.search("chicken").await.unwrap().is_empty());
        assert_eq!(mock.search_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_delay() {
        let mock = MockRemoteSource::new().with_delay("slow", Duration::from_secs(30));
        let start = tokio::time::Instant::now();

        mock.fetch_by_id("slow").await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[test]
    fn test_fixtures_are_consistent() {
        assertions::assert_complete(&fixtures::teriyaki_chicken());
        assert!(fixtures::partial_of(&fixtures::teriyaki_chicken()).is_partial());
        assert!(fixtures::chicken_search_results().iter().all(Recipe::is_partial));
    }
}
