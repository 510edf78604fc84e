//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data folder
pub const DATA_DIR_ENV: &str = "TUNEMAP_DATA_DIR";
/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "TUNEMAP_CONFIG";

const DEFAULT_DATA_DIR: &str = "data";

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_TUNES_URL: &str =
    "https://github.com/adactio/TheSession-data/raw/master/json/tunes.json";
pub const DEFAULT_ALIASES_URL: &str =
    "https://github.com/adactio/TheSession-data/raw/master/json/aliases.json";

/// Place names too common to match on (they yield many false positives)
pub const DEFAULT_IGNORE_LIST: [&str; 10] = [
    "Abbey", "Park", "Cross", "Kill", "Street", "Golden", "Valley", "Tower",
    "Crannog", // common name for a small island
    "Inish",   // "island"
];

/// Separator used to flatten a tune's names into one matching string
pub const DEFAULT_NAME_SEPARATOR: &str = " ; ";

/// Characters accepted right after a place name (end-of-string always is)
pub const DEFAULT_BOUNDARY_CHARS: [char; 2] = [' ', ','];

/// Tracing level used until (and unless) the config names another
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level TOML configuration
///
/// Every section is optional; missing keys take their compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding places.geojson, tunes.json and the merged output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub sources: SourcesConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Remote data sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub overpass_url: String,
    pub tunes_url: String,
    pub aliases_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Attempts per request, including the first one
    pub max_attempts: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            tunes_url: DEFAULT_TUNES_URL.to_string(),
            aliases_url: DEFAULT_ALIASES_URL.to_string(),
            timeout_secs: 90,
            max_attempts: 3,
        }
    }
}

/// Name matching parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Place names never matched
    pub ignore_list: Vec<String>,
    /// Separator joining a tune's names before matching
    pub separator: String,
    /// Characters that may follow a matched place name
    pub boundary_chars: Vec<char>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            ignore_list: DEFAULT_IGNORE_LIST.iter().map(|s| s.to_string()).collect(),
            separator: DEFAULT_NAME_SEPARATOR.to_string(),
            boundary_chars: DEFAULT_BOUNDARY_CHARS.to_vec(),
        }
    }
}

impl TomlConfig {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sources.max_attempts == 0 {
            return Err(Error::Config(
                "sources.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.sources.timeout_secs == 0 {
            return Err(Error::Config(
                "sources.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.matching.separator.is_empty() {
            return Err(Error::Config("matching.separator must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load TOML configuration
///
/// A missing file is not an error: a warning is logged and defaults are used.
/// A file that exists but does not parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
    config.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Default config file location: `<config dir>/tunemap/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunemap").join("config.toml"))
}

/// Config file resolution:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config directory
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Data folder resolution:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. Compiled default (`./data`)
pub fn resolve_data_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.data_dir {
        return path.clone();
    }

    PathBuf::from(DEFAULT_DATA_DIR)
}
