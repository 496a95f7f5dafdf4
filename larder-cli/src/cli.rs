//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(about = "Recipe lookup, meal planning and shopping lists backed by TheMealDB", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, env = "LARDER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show a recipe by id
    Get { id: String },
    /// Search recipes by name
    Search { term: String },
    /// Show a random recipe
    Random,
    /// Warm the cache for a list of ids
    Preload {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete every cached recipe
    ClearCache,
    /// Manage favorite recipes
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },
    /// Manage the week plan
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },
    /// Build the shopping list from the week plan
    Shopping,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FavoritesCommand {
    /// List saved favorites
    List,
    /// Save a recipe as a favorite
    Add { id: String },
    /// Remove a favorite
    Remove { id: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PlanCommand {
    /// Print the week plan
    Show,
    /// Put a recipe into a day's meal slot
    Set {
        day: String,
        /// breakfast, lunch or dinner
        slot: String,
        id: String,
    },
    /// Empty a day's meal slot
    Clear { day: String, slot: String },
}
