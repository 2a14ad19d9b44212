//! ABOUTME: execute_recipe — runs a sub-recipe from disk against the SAME (not cloned) context
//! ABOUTME: Depth is tracked against Executor::max_depth; unbounded recursion is the default

use crate::executor::{config_error, Executor};
use recipe_core::{Context, IfExists, Recipe, RecipeError, Result, StepPath};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Config {
    recipe_path: String,
    #[serde(default)]
    context_overrides: Value,
}

pub(crate) async fn run(
    executor: &Executor,
    raw_config: &Value,
    context: &mut Context,
    path: &StepPath,
    depth: usize,
) -> Result<()> {
    let config: Config =
        serde_json::from_value(raw_config.clone()).map_err(|e| config_error("execute_recipe", e))?;

    if let Some(max_depth) = executor.max_depth() {
        if depth >= max_depth {
            return Err(RecipeError::config_invalid(format!(
                "execute_recipe: max_depth {max_depth} exceeded"
            ))
            .with_step_path(path.clone()));
        }
    }

    let rendered_path = recipe_templates::render(&config.recipe_path, context)
        .map_err(|e| e.with_step_path(path.clone()))?;

    if let Value::Object(overrides) = &config.context_overrides {
        for (key, value) in overrides {
            let rendered = recipe_templates::render_value(value, context)
                .map_err(|e| e.with_step_path(path.clone()))?;
            context.set_with(key.clone(), rendered, IfExists::Overwrite)?;
        }
    }

    let text = std::fs::read_to_string(&rendered_path)
        .map_err(|e| RecipeError::io_failure(&rendered_path, e.to_string()).with_step_path(path.clone()))?;
    let sub_recipe = Recipe::parse(&text).map_err(|e| {
        RecipeError::config_invalid(format!("execute_recipe: invalid recipe at {rendered_path}: {e}"))
            .with_step_path(path.clone())
    })?;

    executor
        .run_steps(&sub_recipe.steps, context, path, depth + 1)
        .await
}
