//! ABOUTME: get_model — resolves a `provider/name[/deployment]` identifier to a ModelHandle

use crate::abstraction::{AzureAuth, ModelHandle, ProviderKind};
use crate::model_specifier::ModelSpecifier;
use crate::ollama::OllamaModelHandle;
use crate::rig_adapter::RigModelHandle;
use recipe_core::{RecipeError, Result};
use std::env;

/// Resolve `identifier` (`provider/name[/deployment]`) into a callable
/// `ModelHandle`, reading provider credentials from the process
/// environment (`.env` must already have been loaded by the caller).
pub fn get_model(identifier: &str) -> Result<Box<dyn ModelHandle>> {
    let spec = ModelSpecifier::parse(identifier)?;
    let kind = ProviderKind::from_tag(&spec.provider).ok_or_else(|| {
        RecipeError::provider_unsupported(format!("unknown provider tag \"{}\"", spec.provider))
    })?;

    let handle: Box<dyn ModelHandle> = match kind {
        ProviderKind::OpenAI => Box::new(RigModelHandle::openai(&spec.name, &require_env("OPENAI_API_KEY")?)),
        ProviderKind::OpenAIResponses => {
            Box::new(RigModelHandle::openai_responses(&spec.name, &require_env("OPENAI_API_KEY")?))
        }
        ProviderKind::Anthropic => {
            Box::new(RigModelHandle::anthropic(&spec.name, &require_env("ANTHROPIC_API_KEY")?))
        }
        ProviderKind::Azure => Box::new(RigModelHandle::azure(&spec.name, false, &AzureAuth::from_env())?),
        ProviderKind::AzureResponses => {
            Box::new(RigModelHandle::azure(&spec.name, true, &AzureAuth::from_env())?)
        }
        ProviderKind::Ollama => {
            let base_url = env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
            Box::new(OllamaModelHandle::new(&spec.name, &base_url))
        }
    };

    Ok(handle)
}

fn require_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| RecipeError::config_invalid(format!("{name} is not set")))
}
