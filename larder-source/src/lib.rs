//! Larder Source - Remote Recipe Source
//!
//! Defines the interface the cache layer uses to reach an upstream recipe
//! catalogue, plus the TheMealDB implementation of it.
//!
//! Upstream sources are untrusted and may be slow or unavailable. Every
//! operation is fallible; callers decide whether a failure degrades or
//! propagates.

use async_trait::async_trait;
use larder_core::{Recipe, SourceError};

pub mod providers;

pub use providers::mealdb::{MealDbClient, MEALDB_BASE_URL};

/// Result alias for remote source operations.
pub type SourceResult<T> = Result<T, SourceError>;

// ============================================================================
// REMOTE SOURCE TRAIT
// ============================================================================

/// Upstream supplier of recipes.
///
/// Implementations must be thread-safe (Send + Sync); the cache calls them
/// from many tasks at once.
///
/// # Example
/// ```ignore
/// let source = MealDbClient::new(Duration::from_secs(10))?;
/// let recipe = source.fetch_by_id("52772").await?;
/// ```
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Fetch one recipe by id.
    ///
    /// # Returns
    /// * `Ok(Some(recipe))` - The full record
    /// * `Ok(None)` - The source has no recipe with that id
    /// * `Err(SourceError)` - The source could not be queried
    async fn fetch_by_id(&self, id: &str) -> SourceResult<Option<Recipe>>;

    /// Search recipes by name. Results may be partial records.
    async fn search(&self, term: &str) -> SourceResult<Vec<Recipe>>;

    /// Fetch a random recipe.
    async fn fetch_random(&self) -> SourceResult<Option<Recipe>>;
}
