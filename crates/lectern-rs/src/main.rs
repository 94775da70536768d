//! Command-line entry point: dispatch one Lectern tool and print its JSON output.

use anyhow::{Context, bail};
use clap::Parser;
use lectern_rs::config::{LayeredConfigOptions, LecternConfig};
use lectern_rs::tools::builtin_tool_registry;
use lectern_rs::{init_logging, tool_context_from_config};
use log::info;
use serde_json::Value;
use std::path::PathBuf;

/// Name that lists tool specs instead of dispatching.
const LIST_COMMAND: &str = "tools";

/// Command-line options for the Lectern CLI.
#[derive(Parser)]
#[command(name = "lectern", version, about)]
struct Cli {
    /// Extra lectern.json5 applied on top of the discovered config layers
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tool arguments as a JSON object
    #[arg(long)]
    args: Option<String>,
    /// Tool to run, or `tools` to list available tools
    tool: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let registry = builtin_tool_registry();

    if cli.tool == LIST_COMMAND {
        println!("{}", serde_json::to_string_pretty(&registry.specs())?);
        return Ok(());
    }
    if registry.get(&cli.tool).is_none() {
        bail!(
            "unknown tool `{}` (available: {})",
            cli.tool,
            registry.list().join(", ")
        );
    }

    let args: Value = match cli.args.as_deref() {
        Some(raw) => serde_json::from_str(raw).context("--args must be valid JSON")?,
        None => Value::Object(Default::default()),
    };

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        options = options.with_runtime_path(path);
    }
    let layered = LecternConfig::load_layered_with_options(options)?;
    info!(
        "config loaded (layers={}, tool={})",
        layered.layers.len(),
        cli.tool
    );

    let ctx = tool_context_from_config(&layered.config, &cwd)?;
    ctx.engine
        .connect()
        .await
        .context("failed to open memory store")?;
    let output = registry.dispatch(&ctx, &cli.tool, args).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
