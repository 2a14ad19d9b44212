//! ABOUTME: Builds the StepRegistry populated with the five built-in leaf step types
//! ABOUTME: execute_recipe/conditional/loop/parallel are not here — the Executor special-cases them

use crate::steps::{LlmGenerate, McpStep, ReadFiles, SetContext, WriteFiles};
use recipe_core::StepRegistry;

#[must_use]
pub fn default_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.register("read_files", Box::new(ReadFiles::from_config));
    registry.register("write_files", Box::new(WriteFiles::from_config));
    registry.register("set_context", Box::new(SetContext::from_config));
    registry.register("llm_generate", Box::new(LlmGenerate::from_config));
    registry.register("mcp", Box::new(McpStep::from_config));
    registry
}
