//! Runtime configuration
//!
//! Layering: built-in defaults, then an optional TOML file, then the
//! `DEBUG` / `YAML_MODE` environment flags.

use crate::error::{Result, SecsyError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming a config file when `--config` is absent
pub const CONFIG_ENV: &str = "SECSY_CONFIG";
pub const DEBUG_ENV: &str = "DEBUG";
pub const YAML_MODE_ENV: &str = "YAML_MODE";
/// Set for the unit-test process to scope which tasks are checked
pub const TEST_COMMANDS_ENV: &str = "TEST_COMMANDS";

/// Configuration structure for secsy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Verbose logging
    pub debug: bool,

    /// Read from `YAML_MODE`; nothing acts on it yet
    pub yaml_mode: bool,

    /// Background worker launcher
    pub worker: WorkerConfig,

    /// Commands behind `utils test`
    pub test: TestConfig,

    /// Task discovery
    pub tasks: TasksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub integration: String,
    pub unit: String,
    pub coverage_report: String,
    pub lint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    /// Directory holding external task descriptors (`*.toml`)
    pub external_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            yaml_mode: false,
            worker: WorkerConfig::default(),
            test: TestConfig::default(),
            tasks: TasksConfig::default(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { command: "celery -A secsy.celery.app worker".to_string() }
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            integration: "cargo test -p secsy-core --test integration".to_string(),
            unit: "cargo llvm-cov --no-report --workspace --lib".to_string(),
            coverage_report: "cargo llvm-cov report".to_string(),
            lint: "cargo clippy --workspace --all-targets -- -D warnings".to_string(),
        }
    }
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self { external_dir: dirs::config_dir().map(|dir| dir.join("secsy").join("tasks")) }
    }
}

impl Config {
    /// Load configuration for this process.
    ///
    /// An explicit `path` must exist. Without one, `SECSY_CONFIG` is tried,
    /// then `<config_dir>/secsy/config.toml` when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(default_config_file);

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            SecsyError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|source| SecsyError::Toml { path: path.to_path_buf(), source })
    }

    /// Override flags from the environment. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(DEBUG_ENV) {
            self.debug = parse_int_flag(DEBUG_ENV, &value)?;
        }
        if let Some(value) = lookup(YAML_MODE_ENV) {
            self.yaml_mode = parse_int_flag(YAML_MODE_ENV, &value)?;
        }
        Ok(())
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("secsy").join("config.toml"))
        .filter(|path| path.is_file())
}

/// `0` is false, any other integer is true
fn parse_int_flag(name: &str, value: &str) -> Result<bool> {
    value
        .trim()
        .parse::<i64>()
        .map(|v| v != 0)
        .map_err(|_| SecsyError::config(format!("{} must be an integer, got '{}'", name, value)))
}
