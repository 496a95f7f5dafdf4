//! Error types for the CLI.

use larder_core::{LarderError, SourceError, StorageError, ValidationError};

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Larder(#[from] LarderError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to initialize logging: {0}")]
    Telemetry(String),
    #[error("No recipe found for {0}")]
    NotFound(String),
}
