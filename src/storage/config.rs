//! Configuration handling for the task board
//!
//! Configuration is stored in `~/.config/taskboard/config.toml` (or the
//! platform equivalent) unless a path is given explicitly.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the snapshot inside the data directory
pub const SNAPSHOT_FILE: &str = "board.json";

/// Largest accepted `default_due_days`, about a century
pub const MAX_DUE_DAYS: u32 = 36_500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot file to use instead of the platform data dir
    pub store_path: Option<PathBuf>,

    /// Seed a fresh board with example tasks
    pub seed_examples: bool,

    /// How long a save may take before it is reported as timed out
    pub save_timeout_ms: u64,

    /// Days from today for the due date of tasks added without one
    pub default_due_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            seed_examples: true,
            save_timeout_ms: 2000,
            default_due_days: 7,
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "taskboard", "taskboard")
    }

    /// Returns the default config file location
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Returns the default snapshot location
    pub fn default_store_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join(SNAPSHOT_FILE))
    }

    /// Loads configuration from `path`, or from the default location
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))
    }

    /// Parses and validates TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.save_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "save_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.default_due_days > MAX_DUE_DAYS {
            return Err(ConfigError::Invalid(format!(
                "default_due_days must be at most {}",
                MAX_DUE_DAYS
            )));
        }
        Ok(())
    }

    /// Resolves the snapshot file: explicit override, then `store_path`,
    /// then the platform data dir
    pub fn snapshot_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.store_path.clone())
            .or_else(Self::default_store_path)
            .ok_or_else(|| {
                anyhow::anyhow!("Could not determine a data directory. Pass --store <path>.")
            })
    }

    pub fn save_timeout(&self) -> Duration {
        Duration::from_millis(self.save_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();

        assert!(config.seed_examples);
        assert_eq!(config.save_timeout(), Duration::from_secs(2));
        assert_eq!(config.default_due_days, 7);
        assert_eq!(config.store_path, None);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
seed_examples = false
default_due_days = 3
"#;

        let config = Config::from_toml(toml).unwrap();
        assert!(!config.seed_examples);
        assert_eq!(config.default_due_days, 3);
        assert_eq!(config.save_timeout_ms, 2000);
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = Config::from_toml("save_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_toml() {
        let err = Config::from_toml("seed_examples = \"maybe\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn rejects_unreasonable_due_days() {
        let err = Config::from_toml("default_due_days = 4000000000").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = Config::from_toml(&format!("default_due_days = {}", MAX_DUE_DAYS)).unwrap();
        assert_eq!(config.default_due_days, MAX_DUE_DAYS);
    }

    #[test]
    fn snapshot_path_precedence() {
        let config = Config {
            store_path: Some(PathBuf::from("/from/config.json")),
            ..Config::default()
        };

        assert_eq!(
            config
                .snapshot_path(Some(Path::new("/from/flag.json")))
                .unwrap(),
            PathBuf::from("/from/flag.json")
        );
        assert_eq!(
            config.snapshot_path(None).unwrap(),
            PathBuf::from("/from/config.json")
        );
    }
}
