//! ABOUTME: recipe-steps — the built-in step catalog plus the Executor that dispatches them
//! ABOUTME: Leaf steps go through StepRegistry; execute_recipe/conditional/loop/parallel are special-cased

mod control_flow;
mod executor;
mod registry_defaults;
mod steps;

pub use executor::Executor;
pub use registry_defaults::default_registry;
pub use steps::{LlmGenerate, McpStep, ReadFiles, SetContext, WriteFiles};
