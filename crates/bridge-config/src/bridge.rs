//! Bridge configuration file (bridge.toml)
//!
//! ```toml
//! [library]
//! name = "tonclient"
//! search_paths = ["./lib"]
//! symbol_prefix = "tc_"
//!
//! [logging]
//! level = "debug"
//!
//! [context]
//! network = { server_address = "http://localhost" }
//! ```

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Accepted `logging.level` values
pub const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Default prefix of the native entry point symbols
pub const DEFAULT_SYMBOL_PREFIX: &str = "tc_";

/// Complete bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Native library to load
    #[serde(default)]
    pub library: LibraryConfig,

    /// Logging preferences
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Configuration passed verbatim (as JSON) to the native library
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<toml::Table>,
}

/// `[library]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Short library name ("tonclient") or path to the library file
    #[serde(default)]
    pub name: String,

    /// Directories searched before the platform defaults
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_paths: Vec<PathBuf>,

    /// Prefix of the exported entry points
    #[serde(default = "default_symbol_prefix")]
    pub symbol_prefix: String,
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of `LOG_LEVELS`
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_symbol_prefix() -> String {
    DEFAULT_SYMBOL_PREFIX.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            search_paths: Vec::new(),
            symbol_prefix: default_symbol_prefix(),
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

impl BridgeConfig {
    /// Load and validate a configuration file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let config = Self::read_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration text; `origin` is only used in error messages
    pub fn from_toml_str(content: &str, origin: &Path) -> ConfigResult<Self> {
        let config = Self::parse(content, origin)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file without validating it
    ///
    /// Used by the loader, which validates after applying overrides.
    pub(crate) fn read_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, origin: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
            file: origin.to_path_buf(),
            error: e,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.library.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "library.name".to_string(),
                reason: "must name a library or a library file".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!(
                    "'{}' is not one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }

    /// The `[context]` table as JSON; an empty object when absent
    pub fn context_json(&self) -> ConfigResult<serde_json::Value> {
        match &self.context {
            Some(table) => Ok(serde_json::to_value(table)?),
            None => Ok(serde_json::Value::Object(serde_json::Map::new())),
        }
    }
}
