//! ABOUTME: Executor — dispatches leaf steps through the registry, special-cases control flow
//! ABOUTME: Control-flow steps need recursive access to the Executor itself, which Step::execute can't express

use crate::control_flow;
use recipe_core::{Context, Recipe, RecipeError, Result, StepDef, StepPath, StepRegistry};
use std::sync::Arc;

/// Runs a parsed `Recipe` against a `Context`, building a `StepPath` as it
/// recurses so a failure deep inside a sub-recipe or loop iteration still
/// names the exact step that raised it.
///
/// Cheap to clone: the registry is `Arc`-shared, so `loop`/`parallel` can
/// hand an owned `Executor` to spawned tasks.
#[derive(Clone)]
pub struct Executor {
    registry: Arc<StepRegistry>,
    max_depth: Option<usize>,
}

impl Executor {
    #[must_use]
    pub fn new(registry: StepRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            max_depth: None,
        }
    }

    /// Bound how many `execute_recipe` levels may nest. `None` (the default)
    /// leaves recursion unbounded.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub async fn run(&self, recipe: &Recipe, context: &mut Context) -> Result<()> {
        self.run_steps(&recipe.steps, context, &StepPath::root(), 0).await
    }

    pub(crate) async fn run_steps(
        &self,
        steps: &[StepDef],
        context: &mut Context,
        path: &StepPath,
        depth: usize,
    ) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            let child_path = path.child_step(index);
            self.run_one(step, context, &child_path, depth).await?;
        }
        Ok(())
    }

    async fn run_one(
        &self,
        step: &StepDef,
        context: &mut Context,
        path: &StepPath,
        depth: usize,
    ) -> Result<()> {
        match step.step_type.as_str() {
            "execute_recipe" => control_flow::execute_recipe::run(self, &step.config, context, path, depth).await,
            "conditional" => control_flow::conditional::run(self, &step.config, context, path, depth).await,
            "loop" => control_flow::loop_step::run(self, &step.config, context, path, depth).await,
            "parallel" => control_flow::parallel::run(self, &step.config, context, path, depth).await,
            other => {
                let step_impl = self
                    .registry
                    .build(other, step.config.clone())
                    .map_err(|e| e.with_step_path(path.clone()))?;
                step_impl
                    .execute(context)
                    .await
                    .map_err(|e| e.with_step_path(path.clone()))
            }
        }
    }
}

pub(crate) fn config_error(step_type: &str, e: impl std::fmt::Display) -> RecipeError {
    RecipeError::config_invalid(format!("{step_type}: {e}"))
}
