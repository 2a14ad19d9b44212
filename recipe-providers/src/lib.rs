//! ABOUTME: recipe-providers — provider/model routing over rig-core and a local Ollama client
//! ABOUTME: get_model(identifier) is the single entry point the llm_generate step calls

mod abstraction;
mod model_specifier;
mod ollama;
mod rig_adapter;
mod router;
mod stub;

pub use abstraction::{
    with_schema_instructions, AzureAuth, GenerateOptions, ModelHandle, ModelOutput, ProviderKind,
    ToolInvoker, ToolSpec,
};
pub use model_specifier::ModelSpecifier;
pub use ollama::OllamaModelHandle;
pub use rig_adapter::RigModelHandle;
pub use router::get_model;
pub use stub::StubModelHandle;
