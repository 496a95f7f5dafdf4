//! Command execution.
//!
//! [`Larder`] wires the recipe cache and the library store over one data
//! directory and renders each command's result as plain text.

use std::io::Write;
use std::sync::Arc;

use larder_core::{MealSlot, Recipe, ShoppingItem, ValidationError, WeekPlan};
use larder_source::RemoteSource;
use larder_storage::{DiskRecordStore, LibraryStore, RecipeCache};
use tracing::info;

use crate::cli::{Command, FavoritesCommand, PlanCommand};
use crate::config::LarderConfig;
use crate::error::CliError;

/// The application: cache plus library, sharing a data directory.
pub struct Larder<R: RemoteSource + ?Sized> {
    cache: RecipeCache<R, DiskRecordStore>,
    library: LibraryStore,
}

impl<R: RemoteSource + ?Sized> Larder<R> {
    pub fn new(remote: Arc<R>, config: &LarderConfig) -> Self {
        Self {
            cache: RecipeCache::open(remote, &config.data_dir, config.cache_config()),
            library: LibraryStore::new(&config.data_dir),
        }
    }

    pub fn cache(&self) -> &RecipeCache<R, DiskRecordStore> {
        &self.cache
    }

    pub fn library(&self) -> &LibraryStore {
        &self.library
    }

    /// Execute one command, writing its output to `out`.
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> Result<(), CliError> {
        match command {
            Command::Get { id } => {
                let recipe = self.require_recipe(&id).await?;
                write_recipe_detail(out, &recipe)?;
            }
            Command::Search { term } => {
                let recipes = self.cache.search_recipes(&term).await?;
                if recipes.is_empty() {
                    writeln!(out, "No recipes found for \"{}\"", term)?;
                }
                for recipe in &recipes {
                    write_recipe_line(out, recipe)?;
                }
            }
            Command::Random => {
                let recipe = self
                    .cache
                    .get_random_recipe()
                    .await
                    .ok_or_else(|| CliError::NotFound("a random pick".to_string()))?;
                write_recipe_detail(out, &recipe)?;
            }
            Command::Preload { ids } => {
                let summary = self.cache.preload(&ids).await;
                writeln!(
                    out,
                    "Preloaded {} of {} recipes ({} already cached, {} not found)",
                    summary.loaded, summary.requested, summary.skipped, summary.missing
                )?;
            }
            Command::ClearCache => {
                let removed = self.cache.clear_cache().await;
                writeln!(out, "Removed {} cached recipes", removed)?;
            }
            Command::Favorites { action } => self.run_favorites(action, out).await?,
            Command::Plan { action } => self.run_plan(action, out).await?,
            Command::Shopping => {
                let items = self.build_shopping_list().await?;
                if items.is_empty() {
                    writeln!(out, "Shopping list is empty")?;
                }
                for item in &items {
                    write_shopping_item(out, item)?;
                }
            }
        }
        Ok(())
    }

    async fn run_favorites<W: Write>(
        &self,
        action: FavoritesCommand,
        out: &mut W,
    ) -> Result<(), CliError> {
        match action {
            FavoritesCommand::List => {
                let favorites = self.library.load_favorites().await?;
                if favorites.is_empty() {
                    writeln!(out, "No favorites yet")?;
                }
                for recipe in &favorites {
                    write_recipe_line(out, recipe)?;
                }
            }
            FavoritesCommand::Add { id } => {
                let recipe = self.require_recipe(&id).await?;
                let name = recipe.name.clone();
                if self.library.add_favorite(recipe).await? {
                    info!(recipe_id = %id, "favorite added");
                    writeln!(out, "Added {} to favorites", name)?;
                } else {
                    writeln!(out, "{} is already a favorite", name)?;
                }
            }
            FavoritesCommand::Remove { id } => {
                if self.library.remove_favorite(&id).await? {
                    writeln!(out, "Removed {} from favorites", id)?;
                } else {
                    writeln!(out, "{} was not a favorite", id)?;
                }
            }
        }
        Ok(())
    }

    async fn run_plan<W: Write>(&self, action: PlanCommand, out: &mut W) -> Result<(), CliError> {
        match action {
            PlanCommand::Show => {
                let plan = self.library.load_week_plan().await?;
                write_week_plan(out, &plan)?;
            }
            PlanCommand::Set { day, slot, id } => {
                let slot: MealSlot = slot.parse()?;
                let recipe = self.require_recipe(&id).await?;
                let name = recipe.name.clone();
                let mut plan = self.library.load_week_plan().await?;
                if !plan.assign(&day, slot, recipe) {
                    return Err(unknown_day(&day).into());
                }
                self.library.save_week_plan(&plan).await?;
                writeln!(out, "{} {}: {}", day, slot, name)?;
            }
            PlanCommand::Clear { day, slot } => {
                let slot: MealSlot = slot.parse()?;
                let mut plan = self.library.load_week_plan().await?;
                if plan.day(&day).is_none() {
                    return Err(unknown_day(&day).into());
                }
                match plan.clear_slot(&day, slot) {
                    Some(recipe) => {
                        self.library.save_week_plan(&plan).await?;
                        writeln!(out, "Removed {} from {} {}", recipe.name, day, slot)?;
                    }
                    None => writeln!(out, "{} {} was already empty", day, slot)?,
                }
            }
        }
        Ok(())
    }

    /// Aggregate the week plan into a shopping list and save it.
    ///
    /// Items that were checked off in the saved list stay checked when the
    /// same name and measure come back.
    pub async fn build_shopping_list(&self) -> Result<Vec<ShoppingItem>, CliError> {
        let plan = self.library.load_week_plan().await?;
        let previous = self.library.load_shopping_list().await?;

        let mut items = plan.shopping_list();
        for item in &mut items {
            item.is_checked = previous.iter().any(|p| {
                p.is_checked && p.name.eq_ignore_ascii_case(&item.name) && p.measure == item.measure
            });
        }

        self.library.save_shopping_list(&items).await?;
        Ok(items)
    }

    async fn require_recipe(&self, id: &str) -> Result<Recipe, CliError> {
        self.cache
            .get_recipe(id)
            .await
            .ok_or_else(|| CliError::NotFound(format!("id {}", id)))
    }
}

fn unknown_day(day: &str) -> ValidationError {
    ValidationError::InvalidInput {
        field: "day".to_string(),
        reason: format!("unknown day '{}'", day),
    }
}

fn write_recipe_line<W: Write>(out: &mut W, recipe: &Recipe) -> std::io::Result<()> {
    let tags: Vec<&str> = [recipe.category.as_str(), recipe.area.as_str()]
        .into_iter()
        .filter(|tag| !tag.is_empty())
        .collect();
    if tags.is_empty() {
        writeln!(out, "{:>6}  {}", recipe.id, recipe.name)
    } else {
        writeln!(out, "{:>6}  {} [{}]", recipe.id, recipe.name, tags.join(", "))
    }
}

fn write_recipe_detail<W: Write>(out: &mut W, recipe: &Recipe) -> std::io::Result<()> {
    write_recipe_line(out, recipe)?;
    if !recipe.ingredients.is_empty() {
        writeln!(out)?;
        for ingredient in &recipe.ingredients {
            if ingredient.measure.is_empty() {
                writeln!(out, "  - {}", ingredient.name)?;
            } else {
                writeln!(out, "  - {}: {}", ingredient.name, ingredient.measure)?;
            }
        }
    }
    if !recipe.instructions.trim().is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", recipe.instructions.trim())?;
    }
    Ok(())
}

fn write_week_plan<W: Write>(out: &mut W, plan: &WeekPlan) -> std::io::Result<()> {
    for day in &plan.days {
        writeln!(out, "{}", day.day)?;
        for slot in [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner] {
            let name = day.slot(slot).map(|r| r.name.as_str()).unwrap_or("-");
            writeln!(out, "  {:<9} {}", slot, name)?;
        }
    }
    Ok(())
}

fn write_shopping_item<W: Write>(out: &mut W, item: &ShoppingItem) -> std::io::Result<()> {
    let mark = if item.is_checked { 'x' } else { ' ' };
    if item.measure.is_empty() {
        writeln!(out, "[{}] {}", mark, item.name)
    } else {
        writeln!(out, "[{}] {}: {}", mark, item.name, item.measure)
    }
}
