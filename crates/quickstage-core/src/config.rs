//! Configuration resolution for `QuickStage`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/quickstage/settings.json`)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)
//!
//! The admin secret is deliberately absent: it is supplied per session.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Complete `QuickStage` configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tickets: TicketConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Where tickets and scan logs are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Database file; `None` resolves to [`database_path`].
    pub database_path: Option<PathBuf>,
}

/// Ticket issuance defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketConfig {
    /// Usage ceiling applied when the operator does not pass one.
    pub default_usage_ceiling: u32,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            default_usage_ceiling: 1,
        }
    }
}

/// Scan pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Upper bound on any single store call (seconds).
    pub store_timeout_secs: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            store_timeout_secs: 5,
        }
    }
}

impl ScannerConfig {
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    // An explicitly requested file must exist.
    if let Some(path) = explicit {
        let overlay = load_config_file(path)?;
        merge_config(&mut config, overlay);
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("quickstage").join("settings.json"))
}

/// Get the default database path.
pub fn database_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("quickstage").join("quickstage.db"))
}

impl Config {
    /// Resolved database path: configured value, else the platform default.
    pub fn resolved_database_path(&self) -> Result<PathBuf> {
        self.storage
            .database_path
            .clone()
            .or_else(database_path)
            .ok_or_else(|| Error::Config("Cannot determine database path".to_string()))
    }
}

/// A config file as written. Every key is optional so that a key the file
/// omits keeps the value from the layer below.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    storage: StorageLayer,
    tickets: TicketLayer,
    scanner: ScannerLayer,
    log: LogLayer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorageLayer {
    database_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TicketLayer {
    default_usage_ceiling: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScannerLayer {
    store_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LogLayer {
    level: Option<String>,
    json: Option<bool>,
}

fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: ConfigLayer) {
    if let Some(path) = overlay.storage.database_path {
        base.storage.database_path = Some(path);
    }
    if let Some(n) = overlay.tickets.default_usage_ceiling {
        base.tickets.default_usage_ceiling = n;
    }
    if let Some(n) = overlay.scanner.store_timeout_secs {
        base.scanner.store_timeout_secs = n;
    }
    if let Some(level) = overlay.log.level {
        base.log.level = level;
    }
    if let Some(json) = overlay.log.json {
        base.log.json = json;
    }
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("QUICKSTAGE_DB_PATH") {
        config.storage.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = var("QUICKSTAGE_DEFAULT_USAGE") {
        if let Ok(n) = val.parse() {
            config.tickets.default_usage_ceiling = n;
        }
    }
    if let Some(val) = var("QUICKSTAGE_STORE_TIMEOUT") {
        if let Ok(n) = val.parse() {
            config.scanner.store_timeout_secs = n;
        }
    }
    if let Some(val) = var("QUICKSTAGE_LOG_LEVEL") {
        config.log.level = val;
    }
    if let Some(val) = var("QUICKSTAGE_LOG_JSON") {
        config.log.json = matches!(val.as_str(), "1" | "true" | "yes");
    }
}
