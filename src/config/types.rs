//! Configuration types.

use crate::format::OutputFormat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Storage and output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Write a starter roster when the database has no data yet.
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,

    /// Default output format for command results (markdown or json).
    #[serde(default)]
    pub default_format: OutputFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            seed_defaults: default_seed_defaults(),
            default_format: OutputFormat::default(),
        }
    }
}

/// Dashboard scheduling hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Window for the "due soon" count, in hours.
    #[serde(default = "default_due_soon_hours")]
    pub due_soon_hours: i64,
}

/// Largest accepted "due soon" window: one leap year.
pub const MAX_DUE_SOON_HOURS: i64 = 24 * 366;

impl ScheduleConfig {
    /// Whether `hours` is a usable "due soon" window.
    pub fn valid_due_soon_hours(hours: i64) -> bool {
        (1..=MAX_DUE_SOON_HOURS).contains(&hours)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            due_soon_hours: default_due_soon_hours(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("crew-dispatch/roster.db")
}

fn default_seed_defaults() -> bool {
    true
}

pub(crate) fn default_due_soon_hours() -> i64 {
    48
}

impl Config {
    /// Load configuration from a single YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
