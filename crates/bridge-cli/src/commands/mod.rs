pub mod call;
pub mod check;

use anyhow::{Context, Result};
use bridge_config::{BridgeConfig, ConfigLoader};
use bridge_runtime::{BridgeClient, TracingLogger};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load configuration from `config_path` or by searching the current directory
///
/// `library` overrides the configured library. Also returns the file the
/// configuration came from, if any, so it can be logged once logging is up.
pub fn load_config(
    config_path: Option<&Path>,
    library: Option<String>,
) -> Result<(BridgeConfig, Option<PathBuf>)> {
    let mut loader = ConfigLoader::new().override_library(library);

    let config = match config_path {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            loader
                .load_from_directory(&cwd)
                .context("Failed to load configuration")?
        }
    };

    Ok((config, loader.source().map(Path::to_path_buf)))
}

/// Start logging for `config` and report where it was loaded from
pub fn init_logging(config: &BridgeConfig, source: Option<&Path>, verbose: bool) {
    crate::logging::init_logging(&config.logging.level, verbose);
    if let Some(source) = source {
        tracing::debug!(target: "bridge", "configuration loaded from {}", source.display());
    }
}

/// Load the configured library and create a context
pub fn connect(config: &BridgeConfig) -> Result<BridgeClient> {
    BridgeClient::from_config(config, Arc::new(TracingLogger))
        .with_context(|| format!("Failed to start bridge for '{}'", config.library.name))
}
