//! In-process memory tier.

use dashmap::DashMap;
use larder_core::Recipe;

/// Concurrent id → recipe map. Never expires; emptied only by `clear`.
#[derive(Debug, Default)]
pub struct MemoryTier {
    entries: DashMap<String, Recipe>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the stored recipe for `id`, partial or not.
    #[cfg(test)]
    fn get(&self, id: &str) -> Option<Recipe> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// Stored recipe for `id` when it is complete.
    pub fn get_complete(&self, id: &str) -> Option<Recipe> {
        self.entries
            .get(id)
            .filter(|entry| entry.is_complete())
            .map(|entry| entry.value().clone())
    }

    /// Store `recipe` under its own id, replacing any previous entry.
    /// Recipes without an id are ignored.
    pub fn insert(&self, recipe: Recipe) {
        if recipe.has_id() {
            self.entries.insert(recipe.id.clone(), recipe);
        }
    }

    #[cfg(test)]
    fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and return how many there were.
    pub fn clear(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}
