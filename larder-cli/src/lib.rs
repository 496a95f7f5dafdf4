//! Larder CLI library exports.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod telemetry;
