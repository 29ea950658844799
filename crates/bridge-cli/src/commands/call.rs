//! Call command - run one native function and print its result

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::PathBuf;

/// Arguments of `bridge call`
pub struct CallArgs {
    pub function: String,
    pub params: String,
    pub config: Option<PathBuf>,
    pub library: Option<String>,
    pub progress: bool,
    pub verbose: bool,
}

pub async fn run(args: CallArgs) -> Result<()> {
    // Reject bad input before touching the library
    let params: Value = serde_json::from_str(&args.params)
        .with_context(|| format!("Invalid params JSON: {}", args.params))?;

    let (config, source) = super::load_config(args.config.as_deref(), args.library)?;
    super::init_logging(&config, source.as_deref(), args.verbose);

    let client = super::connect(&config)?;

    let result: Value = if args.progress {
        client
            .call_with_progress(&args.function, &params, |event: Value, kind| {
                eprintln!("{}", json!({ "type": kind, "event": event }));
            })
            .await?
    } else {
        client.call(&args.function, &params).await?
    };

    println!("{}", serde_json::to_string_pretty(&result)?);

    client.close();
    Ok(())
}
