//! ABOUTME: Step registry — name to step-factory dispatch table
//! ABOUTME: Populated once at startup with the built-in steps; consumers may add custom types

use crate::error::RecipeError;
use crate::step::{Step, StepFactory};
use serde_json::Value;
use std::collections::HashMap;

/// Maps a registered step `type` name to its factory.
#[derive(Default)]
pub struct StepRegistry {
    factories: HashMap<String, StepFactory>,
}

impl StepRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step type. Overwrites any prior registration of the same
    /// name, so consumers can shadow built-ins with custom implementations.
    pub fn register(&mut self, name: impl Into<String>, factory: StepFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Instantiate the step registered under `step_type`, or fail with
    /// `StepUnknown`.
    pub fn build(
        &self,
        step_type: &str,
        config: Value,
    ) -> Result<Box<dyn Step>, RecipeError> {
        let factory = self
            .factories
            .get(step_type)
            .ok_or_else(|| RecipeError::step_unknown(step_type))?;
        factory(config)
    }

    pub fn is_registered(&self, step_type: &str) -> bool {
        self.factories.contains_key(step_type)
    }

    pub fn registered_types(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
