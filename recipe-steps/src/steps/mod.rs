//! ABOUTME: Leaf step implementations registered with a StepRegistry
//! ABOUTME: Control-flow steps (execute_recipe, conditional, loop, parallel) live in the Executor instead

mod llm_generate;
mod mcp_step;
mod read_files;
mod set_context;
mod write_files;

pub use llm_generate::LlmGenerate;
pub use mcp_step::McpStep;
pub use read_files::ReadFiles;
pub use set_context::SetContext;
pub use write_files::WriteFiles;
