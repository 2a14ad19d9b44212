//! ABOUTME: clap argument definitions for the `recipe` binary
//! ABOUTME: One subcommand-free surface: run a recipe file against a context

use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

/// Run a recipe file through the executor.
#[derive(Debug, Parser)]
#[command(name = "recipe", version, about = "Run a declarative recipe through the recipe executor")]
pub struct Cli {
    /// Path to the recipe JSON file to execute.
    pub recipe_path: PathBuf,

    /// Set an initial context value as `key=value`; value is parsed as JSON
    /// when possible, otherwise stored as a string. May be repeated.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_context_override)]
    pub context_overrides: Vec<(String, Value)>,

    /// Load additional context overrides from a JSON object file.
    #[arg(long, value_name = "PATH")]
    pub context_file: Option<PathBuf>,

    /// Tracing verbosity. Overridden by the `RUST_LOG` environment variable
    /// when it is set.
    #[arg(long, value_enum, default_value_t = TraceLevel::Warn, global = true)]
    pub trace: TraceLevel,

    /// Path to a `.env` file to load before reading the environment.
    /// Defaults to `.env` in the current directory.
    #[arg(long, value_name = "PATH", env = "RECIPE_DOTENV_PATH")]
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl TraceLevel {
    #[must_use]
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

fn parse_context_override(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got \"{raw}\""))?;
    if key.is_empty() {
        return Err("context override key must not be empty".to_string());
    }
    let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}
