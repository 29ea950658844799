//! Native Bridge Configuration
//!
//! Describes which native library the bridge loads, how it logs, and the
//! JSON configuration handed to the native library when a context is created.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Global config (~/.native-bridge/config.toml), used when no project file exists
//! 2. Project config (./bridge.toml, searched upwards)
//! 3. Environment variables (BRIDGE_*)
//! 4. CLI flags (`ConfigLoader::override_library`)
//!
//! # Example
//!
//! ```no_run
//! use bridge_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("loading {}", config.library.name);
//! ```

pub mod bridge;
pub mod loader;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating bridge configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No bridge configuration at {0}")]
    NotFound(PathBuf),

    #[error("Cannot read bridge configuration: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{file} is not valid bridge TOML: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Bad value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Context configuration is not representable as JSON: {0}")]
    InvalidContext(#[from] serde_json::Error),

    #[error("Cannot locate the home directory for the global configuration")]
    HomeNotFound,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub use bridge::{BridgeConfig, LibraryConfig, LoggingConfig};
pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
