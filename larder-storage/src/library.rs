//! User library persistence: favorites, the week plan and the shopping list.
//!
//! Each collection is a single JSON document in the data directory. The file
//! names are fixed and never match the cache record pattern, so clearing the
//! cache leaves them alone.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use larder_core::{Recipe, ShoppingItem, StorageError, WeekPlan};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::debug;

pub const FAVORITES_FILE: &str = "favorites.json";
pub const WEEK_PLAN_FILE: &str = "mealplan.json";
pub const SHOPPING_FILE: &str = "shopping.json";

/// JSON-file store for user-owned data.
///
/// Unlike the cache tier, every failure is returned to the caller.
#[derive(Debug, Clone)]
pub struct LibraryStore {
    dir: PathBuf,
}

impl LibraryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // ========================================================================
    // FAVORITES
    // ========================================================================

    pub async fn load_favorites(&self) -> Result<Vec<Recipe>, StorageError> {
        Ok(self.load(FAVORITES_FILE).await?.unwrap_or_default())
    }

    pub async fn save_favorites(&self, favorites: &[Recipe]) -> Result<(), StorageError> {
        self.save(FAVORITES_FILE, &favorites).await
    }

    /// Add a recipe unless one with the same id is already saved.
    ///
    /// Returns whether the list changed.
    pub async fn add_favorite(&self, recipe: Recipe) -> Result<bool, StorageError> {
        let mut favorites = self.load_favorites().await?;
        if favorites.iter().any(|f| f.id == recipe.id) {
            return Ok(false);
        }
        favorites.push(recipe);
        self.save_favorites(&favorites).await?;
        Ok(true)
    }

    /// Remove the favorite with `id`. Returns whether one was removed.
    pub async fn remove_favorite(&self, id: &str) -> Result<bool, StorageError> {
        let mut favorites = self.load_favorites().await?;
        let before = favorites.len();
        favorites.retain(|f| f.id != id);
        if favorites.len() == before {
            return Ok(false);
        }
        self.save_favorites(&favorites).await?;
        Ok(true)
    }

    pub async fn is_favorite(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.load_favorites().await?.iter().any(|f| f.id == id))
    }

    // ========================================================================
    // WEEK PLAN
    // ========================================================================

    /// Saved week plan, or an empty Monday..Sunday plan when none exists.
    pub async fn load_week_plan(&self) -> Result<WeekPlan, StorageError> {
        Ok(self
            .load(WEEK_PLAN_FILE)
            .await?
            .unwrap_or_else(WeekPlan::standard))
    }

    pub async fn save_week_plan(&self, plan: &WeekPlan) -> Result<(), StorageError> {
        self.save(WEEK_PLAN_FILE, plan).await
    }

    // ========================================================================
    // SHOPPING LIST
    // ========================================================================

    pub async fn load_shopping_list(&self) -> Result<Vec<ShoppingItem>, StorageError> {
        Ok(self.load(SHOPPING_FILE).await?.unwrap_or_default())
    }

    pub async fn save_shopping_list(&self, items: &[ShoppingItem]) -> Result<(), StorageError> {
        self.save(SHOPPING_FILE, &items).await
    }

    // ========================================================================
    // FILE ACCESS
    // ========================================================================

    async fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, StorageError> {
        let path = self.dir.join(file);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::Unavailable {
                    path,
                    reason: e.to_string(),
                })
            }
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                path,
                reason: e.to_string(),
            })
    }

    async fn save<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        let path = self.dir.join(file);
        let unavailable = |path: &Path, e: &dyn std::fmt::Display| StorageError::Unavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| unavailable(&self.dir, &e))?;
        let contents = serde_json::to_string_pretty(value).map_err(|e| unavailable(&path, &e))?;
        fs::write(&path, contents)
            .await
            .map_err(|e| unavailable(&path, &e))?;

        debug!(path = %path.display(), "library file saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::MealSlot;
    use tempfile::TempDir;

    fn create_test_store() -> (LibraryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        (LibraryStore::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn test_missing_files_load_defaults() {
        let (store, _dir) = create_test_store();

        assert!(store.load_favorites().await.unwrap().is_empty());
        assert!(store.load_shopping_list().await.unwrap().is_empty());
        assert_eq!(store.load_week_plan().await.unwrap(), WeekPlan::standard());
    }

    #[tokio::test]
    async fn test_add_favorite_rejects_duplicates() {
        let (store, _dir) = create_test_store();
        let recipe = Recipe::new("52772", "Teriyaki Chicken Casserole");

        assert!(store.add_favorite(recipe.clone()).await.unwrap());
        assert!(!store.add_favorite(recipe).await.unwrap());
        assert_eq!(store.load_favorites().await.unwrap().len(), 1);
        assert!(store.is_favorite("52772").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_favorite() {
        let (store, _dir) = create_test_store();
        store.add_favorite(Recipe::new("1", "a")).await.unwrap();
        store.add_favorite(Recipe::new("2", "b")).await.unwrap();

        assert!(store.remove_favorite("1").await.unwrap());
        assert!(!store.remove_favorite("1").await.unwrap());

        let ids: Vec<_> = store
            .load_favorites()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[tokio::test]
    async fn test_week_plan_persists() {
        let (store, _dir) = create_test_store();
        let mut plan = WeekPlan::standard();
        plan.assign("Tuesday", MealSlot::Dinner, Recipe::new("52772", "Teriyaki"));

        store.save_week_plan(&plan).await.unwrap();
        let loaded = store.load_week_plan().await.unwrap();
        assert_eq!(
            loaded.day("tuesday").unwrap().slot(MealSlot::Dinner).unwrap().id,
            "52772"
        );
    }

    #[tokio::test]
    async fn test_shopping_list_keeps_checked_state() {
        let (store, dir) = create_test_store();
        let mut item = ShoppingItem::new("soy sauce", "3/4 cup");
        item.is_checked = true;

        store.save_shopping_list(&[item.clone()]).await.unwrap();
        assert_eq!(store.load_shopping_list().await.unwrap(), vec![item]);

        let raw = std::fs::read_to_string(dir.path().join(SHOPPING_FILE)).unwrap();
        assert!(raw.contains("\"isChecked\": true"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let (store, dir) = create_test_store();
        std::fs::write(dir.path().join(FAVORITES_FILE), "[{").unwrap();

        assert!(matches!(
            store.load_favorites().await,
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let store = LibraryStore::new(&blocker);

        assert!(matches!(
            store.save_favorites(&[]).await,
            Err(StorageError::Unavailable { .. })
        ));
    }
}
