//! ABOUTME: Ollama adapter — direct HTTP client, no SDK, since rig-core has no Ollama backend

use crate::abstraction::{with_schema_instructions, GenerateOptions, ModelHandle, ModelOutput};
use async_trait::async_trait;
use recipe_core::{RecipeError, Result, TypedRecord};
use serde::Deserialize;
use serde_json::json;

pub struct OllamaModelHandle {
    client: reqwest::Client,
    base_url: String,
    model_name: String,
}

impl OllamaModelHandle {
    #[must_use]
    pub fn new(model: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[async_trait]
impl ModelHandle for OllamaModelHandle {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<ModelOutput> {
        if !options.builtin_tools.is_empty() {
            return Err(RecipeError::provider_unsupported(
                "openai_builtin_tools is only supported on Responses-API providers, not ollama",
            ));
        }
        if !options.tools.is_empty() {
            return Err(RecipeError::provider_unsupported(
                "mcp_servers tool-use is not supported by the ollama provider",
            ));
        }

        let effective_prompt = match &options.schema {
            Some(schema) => with_schema_instructions(prompt, schema),
            None => prompt.to_string(),
        };

        let url = format!("{}/api/generate", self.base_url);
        let body = self
            .client
            .post(&url)
            .json(&json!({
                "model": self.model_name,
                "prompt": effective_prompt,
                "stream": false,
            }))
            .send()
            .await
            .map_err(|e| RecipeError::llm_failure("ollama", &self.model_name, e.to_string()))?
            .error_for_status()
            .map_err(|e| RecipeError::llm_failure("ollama", &self.model_name, e.to_string()))?
            .json::<OllamaGenerateResponse>()
            .await
            .map_err(|e| RecipeError::llm_failure("ollama", &self.model_name, e.to_string()))?;

        match &options.schema {
            Some(schema) => {
                let cleaned = body.response.trim().trim_start_matches("```json").trim_start_matches("```").trim_end_matches("```");
                let value: serde_json::Value = serde_json::from_str(cleaned.trim())
                    .map_err(|e| RecipeError::schema_invalid(format!("structured output was not valid JSON: {e}")))?;
                Ok(ModelOutput::Structured(TypedRecord::validate(schema.clone(), value)?))
            }
            None => Ok(ModelOutput::Text(body.response)),
        }
    }

    fn provider_tag(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
