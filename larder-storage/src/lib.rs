//! Larder Storage - Recipe Cache and Library Files
//!
//! The two-tier recipe cache that fronts the remote source, and the JSON
//! store for favorites, the week plan and the shopping list. Both share one
//! data directory.

pub mod cache;
pub mod library;

pub use cache::{
    sanitize_id, CacheConfig, CacheStats, DiskRecordStore, KeyLockRegistry, MemoryTier,
    PreloadSummary, RecipeCache, RecordStore, DEFAULT_RECORD_TTL,
};
pub use library::{LibraryStore, FAVORITES_FILE, SHOPPING_FILE, WEEK_PLAN_FILE};
