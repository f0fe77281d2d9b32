//! Bootstrap configuration loading and resolution
//!
//! Settings are resolved per field in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not an error: defaults are used and a warning is logged.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Module identifier used to namespace messages when none is configured
pub const DEFAULT_MODULE_ID: &str = "character-import";

/// Environment variable naming the TOML config file
pub const ENV_CONFIG: &str = "CIMP_CONFIG";
/// Environment variable naming the SQLite document database
pub const ENV_DATABASE: &str = "CIMP_DATABASE";
/// Environment variable naming a language file to layer over the built-in messages
pub const ENV_CATALOG: &str = "CIMP_CATALOG";
/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "CIMP_LOG_LEVEL";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Identifier used to namespace localized message keys
    #[serde(default = "default_module_id")]
    pub module_id: String,

    /// Path to SQLite document database (optional)
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Path to a JSON language file overriding built-in messages (optional)
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_module_id() -> String {
    DEFAULT_MODULE_ID.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            module_id: default_module_id(),
            database_path: None,
            catalog_path: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Values supplied on the command line; `None` defers to lower tiers
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved bootstrap configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub module_id: String,
    pub database_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub log_level: String,
}

/// Load TOML config, falling back to defaults when the file does not exist
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Default config file location for the platform
///
/// `~/.config/cimp/config.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cimp").join("config.toml"))
}

/// OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cimp").join("documents.db"))
        .unwrap_or_else(|| PathBuf::from("./cimp_data/documents.db"))
}

/// Read a non-blank environment variable
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Resolve bootstrap configuration from all tiers
pub fn resolve(overrides: &CliOverrides) -> Result<ResolvedConfig> {
    let config_path = overrides
        .config_path
        .clone()
        .or_else(|| env_value(ENV_CONFIG).map(PathBuf::from))
        .or_else(default_config_path);

    let toml_config = match config_path {
        Some(path) => load_toml_config(&path)?,
        None => {
            debug!("No config directory available, using built-in defaults");
            TomlConfig::default()
        }
    };

    let module_id = toml_config.module_id.trim().to_string();
    if module_id.is_empty() {
        return Err(Error::Config("module_id must not be empty".to_string()));
    }

    let database_path = overrides
        .database_path
        .clone()
        .or_else(|| env_value(ENV_DATABASE).map(PathBuf::from))
        .or(toml_config.database_path)
        .unwrap_or_else(default_database_path);

    let catalog_path = overrides
        .catalog_path
        .clone()
        .or_else(|| env_value(ENV_CATALOG).map(PathBuf::from))
        .or(toml_config.catalog_path);

    let log_level = overrides
        .log_level
        .clone()
        .or_else(|| env_value(ENV_LOG_LEVEL))
        .unwrap_or(toml_config.logging.level)
        .to_lowercase();
    if !LOG_LEVELS.contains(&log_level.as_str()) {
        return Err(Error::Config(format!(
            "Unknown log level '{}' (expected one of {})",
            log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    Ok(ResolvedConfig {
        module_id,
        database_path,
        catalog_path,
        log_level,
    })
}
