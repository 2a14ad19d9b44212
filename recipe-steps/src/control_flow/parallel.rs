//! ABOUTME: parallel — runs each substep once against its own context clone, bounded by max_concurrency
//! ABOUTME: max_concurrency=0 means unlimited; delay staggers launches; all substeps run before surfacing a failure

use crate::executor::{config_error, Executor};
use recipe_core::{Context, Result, StepDef, StepPath};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default)]
    substeps: Vec<StepDef>,
    #[serde(default)]
    max_concurrency: Option<usize>,
    #[serde(default)]
    delay: Option<f64>,
}

pub(crate) async fn run(
    executor: &Executor,
    raw_config: &Value,
    context: &mut Context,
    path: &StepPath,
    depth: usize,
) -> Result<()> {
    let config: Config = serde_json::from_value(raw_config.clone()).map_err(|e| config_error("parallel", e))?;
    let max_concurrency = config.max_concurrency.unwrap_or(0);
    let semaphore = (max_concurrency > 0).then(|| Arc::new(Semaphore::new(max_concurrency)));

    let mut set = JoinSet::new();
    for (index, substep) in config.substeps.into_iter().enumerate() {
        if let Some(delay) = config.delay {
            if index > 0 && delay > 0.0 {
                tokio::time::sleep(std::time::Duration::from_secs_f64(delay)).await;
            }
        }

        let permit_guard = match &semaphore {
            Some(sem) => Some(sem.clone().acquire_owned().await.expect("semaphore not closed")),
            None => None,
        };
        let executor = executor.clone();
        let mut branch_context = context.clone_deep();
        let substep_path = path.child_substep(index);

        set.spawn(async move {
            let result = executor.run_steps(&[substep], &mut branch_context, &substep_path, depth).await;
            drop(permit_guard);
            (index, result)
        });
    }

    let mut outcomes = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        outcomes.push(joined.expect("parallel substep panicked"));
    }
    outcomes.sort_by_key(|(index, _)| *index);

    for (_, result) in outcomes {
        result?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::SetContext;
    use recipe_core::{Context as RecipeContext, RecipeError, StepRegistry};
    use serde_json::json;

    fn registry_with_set_context() -> StepRegistry {
        let mut registry = StepRegistry::new();
        registry.register("set_context", Box::new(SetContext::from_config));
        registry
    }

    #[tokio::test]
    async fn zero_substeps_is_a_no_op() {
        let executor = Executor::new(registry_with_set_context());
        let mut ctx = RecipeContext::new();
        let raw_config = json!({"substeps": []});
        run(&executor, &raw_config, &mut ctx, &StepPath::root(), 0).await.unwrap();
    }

    #[tokio::test]
    async fn substeps_run_in_isolated_context_clones() {
        let executor = Executor::new(registry_with_set_context());
        let mut ctx = RecipeContext::new();
        let raw_config = json!({
            "substeps": [
                {"type": "set_context", "config": {"key": "a", "value": "1"}},
                {"type": "set_context", "config": {"key": "b", "value": "2"}}
            ]
        });
        run(&executor, &raw_config, &mut ctx, &StepPath::root(), 0).await.unwrap();
        assert!(!ctx.contains("a"));
        assert!(!ctx.contains("b"));
    }

    #[tokio::test]
    async fn unlimited_concurrency_is_max_concurrency_zero() {
        let executor = Executor::new(registry_with_set_context());
        let mut ctx = RecipeContext::new();
        let raw_config = json!({
            "substeps": [
                {"type": "set_context", "config": {"key": "a", "value": "1"}},
                {"type": "set_context", "config": {"key": "b", "value": "2"}}
            ],
            "max_concurrency": 0
        });
        run(&executor, &raw_config, &mut ctx, &StepPath::root(), 0).await.unwrap();
    }

    #[tokio::test]
    async fn first_failure_surfaces_after_all_substeps_complete() {
        let executor = Executor::new(registry_with_set_context());
        let mut ctx = RecipeContext::new();
        let raw_config = json!({
            "substeps": [
                {"type": "set_context", "config": {"key": "k", "value": "v", "if_exists": "bogus"}},
                {"type": "set_context", "config": {"key": "ok", "value": "1"}}
            ]
        });
        let err = run(&executor, &raw_config, &mut ctx, &StepPath::root(), 0).await.unwrap_err();
        assert!(matches!(err, RecipeError::ConfigInvalid { .. }));
    }
}
