//! Configuration loader with tier-based merging.
//!
//! Tiers, lowest to highest: embedded defaults, project
//! (`./crew-dispatch/config.yaml`), user (`~/.crew-dispatch/config.yaml`),
//! then environment variables.

use super::merge::deep_merge_all;
use super::types::{Config, ScheduleConfig, default_due_soon_hours};
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Explicit config file; skips tier merging entirely.
pub const ENV_CONFIG_PATH: &str = "CREW_DISPATCH_CONFIG_PATH";
pub const ENV_DB_PATH: &str = "CREW_DISPATCH_DB_PATH";
pub const ENV_SEED_DEFAULTS: &str = "CREW_DISPATCH_SEED_DEFAULTS";
pub const ENV_DUE_SOON_HOURS: &str = "CREW_DISPATCH_DUE_SOON_HOURS";
pub const ENV_USER_DIR: &str = "CREW_DISPATCH_USER_DIR";
pub const ENV_PROJECT_DIR: &str = "CREW_DISPATCH_PROJECT_DIR";

const CONFIG_FILE: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var(ENV_USER_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".crew-dispatch")));

        let project_dir = std::env::var(ENV_PROJECT_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("crew-dispatch")));

        Self {
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn config_file(&self, tier: ConfigTier) -> Option<PathBuf> {
        let dir = match tier {
            ConfigTier::Project => self.project_dir.as_ref(),
            ConfigTier::User => self.user_dir.as_ref(),
            ConfigTier::Defaults | ConfigTier::Environment => None,
        }?;
        Some(dir.join(CONFIG_FILE))
    }
}

/// Read one tier's YAML file as a JSON value, if it exists and parses.
fn read_tier(path: &Path, tier: ConfigTier) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), %tier, error = %e, "Skipping unreadable config file");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(path = %path.display(), %tier, "Loaded config tier");
            Some(value)
        }
        Err(e) => {
            warn!(path = %path.display(), %tier, error = %e, "Skipping malformed config file");
            None
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-tier config file that contributed, if any.
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with(paths, |key| std::env::var(key).ok())
    }

    /// Load with an explicit environment lookup.
    pub fn load_with<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(explicit_path) = env(ENV_CONFIG_PATH) {
            let path = PathBuf::from(&explicit_path);
            let mut config = Config::load(&path)?;
            Self::apply_env_overrides(&mut config, &env);
            Self::validate(&mut config);
            return Ok(Self {
                paths,
                config,
                config_path: Some(path),
            });
        }

        let mut configs: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut config_path = None;

        for tier in [ConfigTier::Project, ConfigTier::User] {
            if let Some(file) = paths.config_file(tier)
                && let Some(value) = read_tier(&file, tier)
            {
                configs.push(value);
                config_path = Some(file);
            }
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        Self::apply_env_overrides(&mut config, &env);
        Self::validate(&mut config);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides<F>(config: &mut Config, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = env(ENV_DB_PATH) {
            config.server.db_path = PathBuf::from(db_path);
        }

        if let Some(raw) = env(ENV_SEED_DEFAULTS) {
            match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.server.seed_defaults = true,
                "0" | "false" | "no" | "off" => config.server.seed_defaults = false,
                other => warn!(value = %other, "Ignoring invalid {}", ENV_SEED_DEFAULTS),
            }
        }

        if let Some(raw) = env(ENV_DUE_SOON_HOURS) {
            match raw.trim().parse::<i64>() {
                Ok(hours) if ScheduleConfig::valid_due_soon_hours(hours) => {
                    config.schedule.due_soon_hours = hours
                }
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_DUE_SOON_HOURS),
            }
        }
    }

    /// Replace out-of-range values coming from config files with defaults.
    fn validate(config: &mut Config) {
        let hours = config.schedule.due_soon_hours;
        if !ScheduleConfig::valid_due_soon_hours(hours) {
            warn!(
                value = hours,
                fallback = default_due_soon_hours(),
                "Ignoring out-of-range schedule.due_soon_hours"
            );
            config.schedule.due_soon_hours = default_due_soon_hours();
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
