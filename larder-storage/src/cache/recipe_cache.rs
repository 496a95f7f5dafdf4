//! Two-tier recipe cache in front of a remote source.
//!
//! Lookups consult memory, then the disk tier, then the remote source, and
//! fill both tiers on the way back. Single-recipe fetches are serialized per
//! id so concurrent callers asking for the same recipe cause at most one
//! remote call, whether that call finds the recipe or not.

use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use larder_core::{LarderResult, Recipe, SourceError};
use larder_source::{RemoteSource, SourceResult};
use tracing::{debug, info, warn};

use super::disk_backend::{DiskRecordStore, DEFAULT_RECORD_TTL};
use super::key_lock::KeyLockRegistry;
use super::memory::MemoryTier;
use super::traits::{CacheStats, RecordStore};

/// Configuration for the recipe cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Age after which a disk record is discarded.
    pub record_ttl: Duration,
    /// Upper bound on any single remote call.
    pub fetch_timeout: Duration,
    /// Pause after each remote fetch during preload.
    pub preload_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            record_ttl: DEFAULT_RECORD_TTL,
            fetch_timeout: Duration::from_secs(15),
            preload_delay: Duration::from_millis(100),
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the disk record TTL.
    pub fn with_record_ttl(mut self, ttl: Duration) -> Self {
        self.record_ttl = ttl;
        self
    }

    /// Set the remote call timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the delay between preload fetches.
    pub fn with_preload_delay(mut self, delay: Duration) -> Self {
        self.preload_delay = delay;
        self
    }
}

/// Outcome of a preload pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadSummary {
    /// Ids handed to `preload`.
    pub requested: usize,
    /// Blank ids and ids already on disk.
    pub skipped: usize,
    /// Ids fetched and cached.
    pub loaded: usize,
    /// Ids the source could not supply.
    pub missing: usize,
}

#[derive(Debug, Default)]
struct Counters {
    memory_hits: AtomicU64,
    disk_hits: AtomicU64,
    remote_fetches: AtomicU64,
    random_fetches: AtomicU64,
    remote_failures: AtomicU64,
    misses: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            random_fetches: self.random_fetches.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Recipe cache with a memory tier, a durable tier and per-id single-flight.
///
/// # Type Parameters
///
/// - `R`: the remote source consulted on a miss
/// - `D`: the durable record store
///
/// One instance is meant to live for the whole process and be shared
/// behind an `Arc`.
pub struct RecipeCache<R, D>
where
    R: RemoteSource + ?Sized,
    D: RecordStore + ?Sized,
{
    remote: Arc<R>,
    disk: Arc<D>,
    memory: MemoryTier,
    locks: KeyLockRegistry<Option<Recipe>>,
    config: CacheConfig,
    counters: Counters,
}

impl<R> RecipeCache<R, DiskRecordStore>
where
    R: RemoteSource + ?Sized,
{
    /// Create a cache whose disk tier lives in `data_dir`, using the
    /// configured record TTL.
    pub fn open(remote: Arc<R>, data_dir: impl Into<PathBuf>, config: CacheConfig) -> Self {
        let disk = DiskRecordStore::new(data_dir).with_ttl(config.record_ttl);
        Self::new(remote, Arc::new(disk), config)
    }
}

impl<R, D> RecipeCache<R, D>
where
    R: RemoteSource + ?Sized,
    D: RecordStore + ?Sized,
{
    /// Create a new recipe cache.
    pub fn new(remote: Arc<R>, disk: Arc<D>, config: CacheConfig) -> Self {
        Self {
            remote,
            disk,
            memory: MemoryTier::new(),
            locks: KeyLockRegistry::new(),
            config,
            counters: Counters::default(),
        }
    }

    /// Create a new recipe cache with default configuration.
    pub fn with_defaults(remote: Arc<R>, disk: Arc<D>) -> Self {
        Self::new(remote, disk, CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn disk(&self) -> &D {
        &self.disk
    }

    /// Number of recipes held in memory.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Number of ids with a fetch in progress or queued.
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Get a complete recipe by id.
    ///
    /// Returns `None` for a blank id, an id the source does not know, or
    /// when the source fails. Failures are logged, never returned.
    pub async fn get_recipe(&self, id: &str) -> Option<Recipe> {
        if id.trim().is_empty() {
            debug!("ignoring lookup for blank recipe id");
            return None;
        }

        if let Some(recipe) = self.memory.get_complete(id) {
            Counters::bump(&self.counters.memory_hits);
            debug!(recipe_id = id, "memory hit");
            return Some(recipe);
        }

        // Callers queued behind a fill for the same id take its outcome,
        // found or not, instead of asking the source again.
        self.locks.single_flight(id, || self.fill(id)).await
    }

    /// Miss path, run under the per-id lock.
    async fn fill(&self, id: &str) -> Option<Recipe> {
        // Another caller may have filled memory while we waited.
        if let Some(recipe) = self.memory.get_complete(id) {
            Counters::bump(&self.counters.memory_hits);
            debug!(recipe_id = id, "memory hit after wait");
            return Some(recipe);
        }

        if let Some(recipe) = self.disk.read(id).await.filter(Recipe::is_complete) {
            Counters::bump(&self.counters.disk_hits);
            debug!(recipe_id = id, "disk hit");
            self.memory.insert(recipe.clone());
            return Some(recipe);
        }

        Counters::bump(&self.counters.remote_fetches);
        let fetched = self
            .call_remote("fetch_by_id", self.remote.fetch_by_id(id))
            .await;

        match fetched {
            Ok(Some(mut recipe)) => {
                if !recipe.has_id() {
                    recipe.id = id.to_string();
                }
                info!(recipe_id = id, source = self.remote.name(), "fetched recipe");
                self.store(&recipe).await;
                Some(recipe)
            }
            Ok(None) => {
                Counters::bump(&self.counters.misses);
                info!(recipe_id = id, source = self.remote.name(), "recipe not found");
                None
            }
            Err(e) => {
                Counters::bump(&self.counters.remote_failures);
                Counters::bump(&self.counters.misses);
                warn!(recipe_id = id, error = %e, "recipe fetch failed");
                None
            }
        }
    }

    /// Search the remote source by name.
    ///
    /// Every result with an id is written to both tiers, summary-only
    /// records included. A blank term yields an empty list without a
    /// remote call.
    pub async fn search_recipes(&self, term: &str) -> LarderResult<Vec<Recipe>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }

        let recipes = match self.call_remote("search", self.remote.search(term)).await {
            Ok(recipes) => recipes,
            Err(e) => {
                Counters::bump(&self.counters.remote_failures);
                warn!(term, error = %e, "recipe search failed");
                return Err(e.into());
            }
        };

        for recipe in recipes.iter().filter(|r| r.has_id()) {
            self.store(recipe).await;
        }
        info!(term, results = recipes.len(), "search complete");
        Ok(recipes)
    }

    /// Fetch a random recipe. Always asks the remote source.
    pub async fn get_random_recipe(&self) -> Option<Recipe> {
        Counters::bump(&self.counters.random_fetches);
        match self
            .call_remote("fetch_random", self.remote.fetch_random())
            .await
        {
            Ok(Some(recipe)) => {
                info!(recipe_id = %recipe.id, "fetched random recipe");
                self.store(&recipe).await;
                Some(recipe)
            }
            Ok(None) => {
                Counters::bump(&self.counters.misses);
                debug!("source returned no random recipe");
                None
            }
            Err(e) => {
                Counters::bump(&self.counters.remote_failures);
                warn!(error = %e, "random recipe fetch failed");
                None
            }
        }
    }

    /// Empty memory and delete every disk record.
    ///
    /// Returns the number of disk records removed. Fetches already in
    /// progress are not interrupted and may repopulate the cache.
    pub async fn clear_cache(&self) -> u64 {
        let dropped = self.memory.clear();
        let removed = self.disk.clear().await;
        info!(memory_entries = dropped, disk_records = removed, "cache cleared");
        removed
    }

    /// Warm the cache for `ids`, one at a time.
    ///
    /// Ids already on disk are skipped regardless of age. After each fetch
    /// the configured preload delay is observed.
    pub async fn preload<I, S>(&self, ids: I) -> PreloadSummary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut summary = PreloadSummary::default();

        for id in ids {
            let id = id.as_ref();
            summary.requested += 1;

            if id.trim().is_empty() || self.disk.contains(id).await {
                summary.skipped += 1;
                continue;
            }

            match self.get_recipe(id).await {
                Some(_) => summary.loaded += 1,
                None => summary.missing += 1,
            }
            tokio::time::sleep(self.config.preload_delay).await;
        }

        info!(
            requested = summary.requested,
            skipped = summary.skipped,
            loaded = summary.loaded,
            missing = summary.missing,
            "preload finished"
        );
        summary
    }

    /// Put a recipe in memory and on disk. Disk failures are logged.
    async fn store(&self, recipe: &Recipe) {
        if !recipe.has_id() {
            return;
        }
        self.memory.insert(recipe.clone());
        if let Err(e) = self.disk.write(recipe).await {
            warn!(recipe_id = %recipe.id, error = %e, "disk write failed, keeping memory copy only");
        }
    }

    /// Run a remote call under the configured timeout.
    async fn call_remote<T, F>(&self, operation: &str, call: F) -> SourceResult<T>
    where
        F: Future<Output = SourceResult<T>>,
    {
        let limit = self.config.fetch_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::TimedOut {
                provider: self.remote.name().to_string(),
                operation: operation.to_string(),
                timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

impl<R, D> std::fmt::Debug for RecipeCache<R, D>
where
    R: RemoteSource + ?Sized,
    D: RecordStore + ?Sized,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeCache")
            .field("source", &self.remote.name())
            .field("memory_entries", &self.memory.len())
            .field("in_flight", &self.locks.len())
            .field("config", &self.config)
            .finish()
    }
}
