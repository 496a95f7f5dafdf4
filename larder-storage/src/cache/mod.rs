//! Two-tier recipe cache.
//!
//! # Tiers
//!
//! - [`MemoryTier`]: process-lifetime map, no expiry.
//! - [`DiskRecordStore`]: one JSON file per recipe, expired by file age.
//!
//! [`RecipeCache`] composes both with a [`RemoteSource`](larder_source::RemoteSource)
//! and a [`KeyLockRegistry`] so that concurrent lookups for one id cost a
//! single remote call.
//!
//! # Degradation
//!
//! Disk problems never reach the caller. An unreadable or expired record is
//! a miss; a failed write leaves the recipe in memory only.
//!
//! # Example
//!
//! ```ignore
//! let source = Arc::new(MealDbClient::new(Duration::from_secs(10))?);
//! let cache = RecipeCache::open(source, "/var/lib/larder", CacheConfig::default());
//!
//! let recipe = cache.get_recipe("52772").await;
//! let hits = cache.search_recipes("chicken").await?;
//! ```

pub mod disk_backend;
pub mod key_lock;
pub mod memory;
pub mod recipe_cache;
pub mod traits;

pub use disk_backend::{sanitize_id, DiskRecordStore, DEFAULT_RECORD_TTL};
pub use key_lock::KeyLockRegistry;
pub use memory::MemoryTier;
pub use recipe_cache::{CacheConfig, PreloadSummary, RecipeCache};
pub use traits::{CacheStats, RecordStore};
