//! ABOUTME: loop — iterates items against a cloned context per iteration, aggregates results in order
//! ABOUTME: fail_fast=false collects per-iteration failures into "<result_key>_errors" instead of aborting

use super::run_bounded;
use crate::executor::{config_error, Executor};
use recipe_core::{Context, RecipeError, Result, StepDef, StepPath};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Config {
    items: Value,
    item_key: String,
    #[serde(default)]
    result_key: Option<String>,
    #[serde(default)]
    substeps: Vec<StepDef>,
    #[serde(default)]
    max_concurrency: Option<usize>,
    #[serde(default)]
    fail_fast: Option<bool>,
}

/// `items` is either the name of a context key holding an array, or an
/// inline array whose string entries are template-rendered first.
fn resolve_items(items: &Value, context: &Context) -> Result<Vec<Value>> {
    match items {
        Value::String(key) => match context.get_required(key)? {
            Value::Array(values) => Ok(values.clone()),
            other => Err(RecipeError::config_invalid(format!(
                "loop: context key \"{key}\" is not a list ({other:?})"
            ))),
        },
        Value::Array(values) => values.iter().map(|v| recipe_templates::render_value(v, context)).collect(),
        other => Err(RecipeError::config_invalid(format!(
            "loop: items must be a context key name or a list, got {other:?}"
        ))),
    }
}

pub(crate) async fn run(
    executor: &Executor,
    raw_config: &Value,
    context: &mut Context,
    path: &StepPath,
    depth: usize,
) -> Result<()> {
    let config: Config = serde_json::from_value(raw_config.clone()).map_err(|e| config_error("loop", e))?;
    let fail_fast = config.fail_fast.unwrap_or(true);
    let max_concurrency = config.max_concurrency.unwrap_or(1);

    let items = resolve_items(&config.items, context).map_err(|e| e.with_step_path(path.clone()))?;

    let mut tasks = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let executor = executor.clone();
        let mut iteration_context = context.clone_deep();
        let item_key = config.item_key.clone();
        let substeps = config.substeps.clone();
        let iteration_path = path.child_substep(index);
        tasks.push(async move {
            iteration_context.set(item_key, item);
            let result = executor.run_steps(&substeps, &mut iteration_context, &iteration_path, depth).await;
            (result, iteration_context)
        });
    }

    let outcomes = run_bounded(tasks, max_concurrency).await;

    let Some(result_key) = &config.result_key else {
        if fail_fast {
            if let Some((Err(e), _)) = outcomes.into_iter().find(|(r, _)| r.is_err()) {
                return Err(e);
            }
        }
        return Ok(());
    };

    let mut results = Vec::with_capacity(outcomes.len());
    let mut errors = serde_json::Map::new();
    for (index, (outcome, iteration_context)) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(()) => results.push(Value::Object(iteration_context.as_dict())),
            Err(e) if fail_fast => return Err(e),
            Err(e) => {
                results.push(Value::Null);
                errors.insert(index.to_string(), Value::String(e.to_string()));
            }
        }
    }

    context.set(result_key.clone(), Value::Array(results));
    if !errors.is_empty() {
        context.set(format!("{result_key}_errors"), Value::Object(errors));
    }
    Ok(())
}
