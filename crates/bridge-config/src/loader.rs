//! Configuration Loader
//!
//! Finds the configuration file, applies environment overrides and validates
//! the result.

use crate::bridge::BridgeConfig;
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "bridge.toml";

/// Configuration loader
///
/// Sources, lowest priority first:
/// 1. Global config (~/.native-bridge/config.toml), only if no bridge.toml is found
/// 2. Project config (bridge.toml in the start directory or any parent)
/// 3. Environment variables (BRIDGE_*)
/// 4. Library override (`override_library`, set from the CLI)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
    /// File the last configuration was read from
    source: Option<PathBuf>,
    /// Library named on the command line; wins over every other source
    library_override: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            global_config_path: None,
            source: None,
            library_override: None,
        }
    }

    /// Use `name` as the library regardless of files and environment
    pub fn override_library(mut self, name: Option<String>) -> Self {
        self.library_override = name;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find bridge.toml and falls back to the
    /// global config file.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<BridgeConfig> {
        let path = match Self::find_config_file(start_dir) {
            Some(path) => Some(path),
            None => self.existing_global_config(),
        };

        let config = match &path {
            Some(path) => BridgeConfig::read_from_file(path)?,
            None => BridgeConfig::default(),
        };
        self.source = path;

        self.finish(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<BridgeConfig> {
        let config = BridgeConfig::read_from_file(config_path)?;
        self.source = Some(config_path.to_path_buf());
        self.finish(config)
    }

    /// File the last loaded configuration came from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Find bridge.toml in `start_dir` or its closest ancestor
    pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
        start_dir
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    fn existing_global_config(&mut self) -> Option<PathBuf> {
        if self.global_config_path.is_none() {
            self.global_config_path = Self::global_config_path().ok();
        }

        self.global_config_path
            .as_ref()
            .filter(|path| path.is_file())
            .cloned()
    }

    fn finish(&self, config: BridgeConfig) -> ConfigResult<BridgeConfig> {
        let mut config = self.apply_env_overrides(config);
        if let Some(name) = &self.library_override {
            config.library.name = name.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// - BRIDGE_LIBRARY: library name or path
    /// - BRIDGE_LIBRARY_PATH: extra search paths (platform path list syntax)
    /// - BRIDGE_SYMBOL_PREFIX: entry point prefix
    /// - BRIDGE_LOG: log level
    fn apply_env_overrides(&self, mut config: BridgeConfig) -> BridgeConfig {
        if let Ok(name) = env::var("BRIDGE_LIBRARY") {
            config.library.name = name;
        }

        if let Some(paths) = env::var_os("BRIDGE_LIBRARY_PATH") {
            let mut search_paths: Vec<PathBuf> = env::split_paths(&paths).collect();
            search_paths.append(&mut config.library.search_paths);
            config.library.search_paths = search_paths;
        }

        if let Ok(prefix) = env::var("BRIDGE_SYMBOL_PREFIX") {
            config.library.symbol_prefix = prefix;
        }

        if let Ok(level) = env::var("BRIDGE_LOG") {
            config.logging.level = level.to_lowercase();
        }

        config
    }

    /// Get the global configuration directory (~/.native-bridge)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".native-bridge"))
    }

    /// Get the global configuration file path (~/.native-bridge/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        Ok(Self::global_config_dir()?.join("config.toml"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
