//! Check command - verify that a context can be created

use anyhow::Result;
use std::path::Path;

/// Load the library, create a context, report it and destroy it again
pub fn run(config_path: Option<&Path>, library: Option<String>, verbose: bool) -> Result<()> {
    let (config, source) = super::load_config(config_path, library)?;
    super::init_logging(&config, source.as_deref(), verbose);

    let client = super::connect(&config)?;
    println!("{}: context {} created", config.library.name, client.context());

    client.close();
    Ok(())
}
