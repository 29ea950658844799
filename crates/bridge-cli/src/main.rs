use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

/// Call functions of a native library through the JSON bridge.
///
/// The library, its symbol prefix and the context configuration come from
/// bridge.toml (searched upwards from the current directory), then
/// ~/.native-bridge/config.toml, then BRIDGE_* environment variables.
///
/// EXAMPLES:
///     bridge check                                 Create and destroy a context
///     bridge call client.version                   Call without parameters
///     bridge call crypto.sha256 '{"data":"aGk="}'  Call with JSON parameters
///     bridge call net.process '{}' --progress      Print progress events to stderr
///
/// ENVIRONMENT VARIABLES:
///     BRIDGE_LIBRARY        Library name or path
///     BRIDGE_LIBRARY_PATH   Extra library search paths
///     BRIDGE_SYMBOL_PREFIX  Prefix of the native entry points
///     BRIDGE_LOG            Log level (off, error, warn, info, debug, trace)
#[derive(Parser)]
#[command(name = "bridge")]
#[command(version = bridge_runtime::VERSION)]
#[command(propagate_version = true)]
struct Cli {
    /// Log bridge activity at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a native function and print its result
    ///
    /// The result is pretty-printed JSON on stdout. With --progress, every
    /// progress event is printed to stderr as one JSON line.
    ///
    /// EXAMPLES:
    ///     bridge call client.version
    ///     bridge call crypto.sha256 '{"data":"aGk="}' --library ./libtonclient.so
    Call {
        /// Function name, e.g. "client.version"
        function: String,
        /// Parameters as JSON text
        #[arg(default_value = "{}")]
        params: String,
        /// Configuration file (default: bridge.toml in this or a parent directory)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
        /// Library name or path; overrides the configuration
        #[arg(long, short = 'l')]
        library: Option<String>,
        /// Print progress events to stderr
        #[arg(long, short = 'p')]
        progress: bool,
    },

    /// Load the library and create a context
    ///
    /// Verifies that the configuration is valid, the library exports every
    /// entry point and accepts the context configuration.
    Check {
        /// Configuration file (default: bridge.toml in this or a parent directory)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
        /// Library name or path; overrides the configuration
        #[arg(long, short = 'l')]
        library: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Call {
            function,
            params,
            config,
            library,
            progress,
        } => {
            let args = commands::call::CallArgs {
                function,
                params,
                config,
                library,
                progress,
                verbose: cli.verbose,
            };
            commands::call::run(args).await?;
        }
        Commands::Check { config, library } => {
            commands::check::run(config.as_deref(), library, cli.verbose)?;
        }
    }

    Ok(())
}
