//! ABOUTME: `recipe` binary entry point — load env, parse args, run a recipe, report exit code
//! ABOUTME: The executor itself lives in recipe-steps; this crate only adapts it to a process

mod cli;

use clap::Parser;
use cli::{Cli, TraceLevel};
use recipe_core::{Context, IfExists, Recipe};
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    load_dotenv(cli.env_file.as_deref());
    setup_tracing(cli.trace);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// `.env` is loaded once before any environment inspection; process
/// environment variables that are already set win over `.env` entries.
fn load_dotenv(env_file: Option<&std::path::Path>) {
    let result = match env_file {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    if let Err(err) = result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == io::ErrorKind::NotFound) {
            tracing::warn!(%err, "failed to load .env file");
        }
    }
}

/// `RUST_LOG` takes priority over `--trace` when set.
fn setup_tracing(trace: TraceLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(trace.as_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let recipe_text = std::fs::read_to_string(&cli.recipe_path)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", cli.recipe_path.display()))?;
    let recipe = Recipe::parse(&recipe_text)
        .map_err(|e| anyhow::anyhow!("parsing {}: {e}", cli.recipe_path.display()))?;

    let mut context = Context::new();
    if let Some(path) = &cli.context_file {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading context file {}: {e}", path.display()))?;
        let overrides: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("parsing context file {}: {e}", path.display()))?;
        for (key, value) in overrides {
            context.set_with(key, value, IfExists::Overwrite)?;
        }
    }
    for (key, value) in cli.context_overrides.clone() {
        context.set_with(key, value, IfExists::Overwrite)?;
    }

    let executor = recipe_steps::Executor::new(recipe_steps::default_registry());
    executor.run(&recipe, &mut context).await?;
    Ok(())
}
