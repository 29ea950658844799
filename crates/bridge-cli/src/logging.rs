use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise the tracing subscriber once per process
///
/// `RUST_LOG` wins over the configured level; `--verbose` wins over both.
pub fn init_logging(configured_level: &str, verbose: bool) {
    INIT.call_once(|| {
        let env_filter = if verbose {
            EnvFilter::new("bridge=debug")
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("bridge={}", configured_level)))
        };

        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    });
}
