//! Record store trait and cache statistics.

use async_trait::async_trait;
use larder_core::{Recipe, StorageError};

/// Durable tier of the recipe cache.
///
/// Implementations own a key space of recipe ids and must be safe to call
/// from many tasks at once. Reads never fail: anything that cannot be
/// served (missing, expired, undecodable) is reported as absent.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the record for `id`, or `None` when absent, expired or corrupt.
    async fn read(&self, id: &str) -> Option<Recipe>;

    /// Persist `recipe` under its own id. A recipe without an id is skipped.
    async fn write(&self, recipe: &Recipe) -> Result<(), StorageError>;

    /// Whether a record exists for `id`, regardless of its age.
    async fn contains(&self, id: &str) -> bool;

    /// Remove every record. Returns how many were removed.
    async fn clear(&self) -> u64;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the memory tier.
    pub memory_hits: u64,
    /// Lookups served from the disk tier.
    pub disk_hits: u64,
    /// Fetch-by-id calls made to the remote source after both tiers missed.
    pub remote_fetches: u64,
    /// Random picks requested from the remote source. These never consult
    /// the cache and are left out of [`CacheStats::hit_rate`].
    pub random_fetches: u64,
    /// Remote calls that failed or timed out.
    pub remote_failures: u64,
    /// Lookups that ended without a recipe.
    pub misses: u64,
}

impl CacheStats {
    /// Share of id lookups answered by either cache tier (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.disk_hits;
        let total = hits + self.remote_fetches;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
