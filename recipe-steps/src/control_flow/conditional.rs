//! ABOUTME: conditional — renders a template condition, runs one of two branches

use crate::executor::{config_error, Executor};
use recipe_core::{Context, Result, StepDef, StepPath};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct Branch {
    #[serde(default)]
    steps: Vec<StepDef>,
}

#[derive(Debug, Deserialize)]
struct Config {
    condition: String,
    #[serde(default)]
    if_true: Option<Branch>,
    #[serde(default)]
    if_false: Option<Branch>,
}

fn is_truthy(rendered: &str) -> bool {
    !matches!(rendered.trim().to_ascii_lowercase().as_str(), "" | "false" | "0")
}

pub(crate) async fn run(
    executor: &Executor,
    raw_config: &Value,
    context: &mut Context,
    path: &StepPath,
    depth: usize,
) -> Result<()> {
    let config: Config =
        serde_json::from_value(raw_config.clone()).map_err(|e| config_error("conditional", e))?;

    let rendered = recipe_templates::render(&config.condition, context)
        .map_err(|e| e.with_step_path(path.clone()))?;

    let branch = if is_truthy(&rendered) { config.if_true } else { config.if_false };
    let Some(branch) = branch else {
        return Ok(());
    };

    executor
        .run_steps(&branch.steps, context, &path.child_substep(0), depth)
        .await
}
