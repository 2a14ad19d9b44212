//! ABOUTME: ModelHandle adapters backed by rig-core's OpenAI and Anthropic clients
//! ABOUTME: Azure variants reuse the OpenAI-compatible client pointed at the Azure base URL

use crate::abstraction::{
    with_schema_instructions, AzureAuth, GenerateOptions, ModelHandle, ModelOutput, ProviderKind,
};
use async_trait::async_trait;
use recipe_core::{RecipeError, RecordSchema, Result, TypedRecord};
use rig::completion::{CompletionModel, ToolDefinition};
use rig::providers;

/// A model is given this many chances to resolve its own tool calls before
/// the step gives up; prevents a misbehaving model from looping forever.
const MAX_TOOL_TURNS: usize = 4;

enum Inner {
    OpenAI(providers::openai::CompletionModel),
    Anthropic(providers::anthropic::completion::CompletionModel),
}

/// Handle backed by rig-core: covers `openai`, `openai_responses`, `azure`,
/// `azure_responses`, and `anthropic`. The Responses-API distinction only
/// affects whether `builtin_tools` are accepted (rig-core exposes one
/// completion surface regardless of the underlying OpenAI API variant).
pub struct RigModelHandle {
    kind: ProviderKind,
    model_name: String,
    inner: Inner,
}

impl RigModelHandle {
    pub fn openai(model: &str, api_key: &str) -> Self {
        let client = providers::openai::Client::new(api_key);
        Self {
            kind: ProviderKind::OpenAI,
            model_name: model.to_string(),
            inner: Inner::OpenAI(client.completion_model(model)),
        }
    }

    pub fn openai_responses(model: &str, api_key: &str) -> Self {
        let client = providers::openai::Client::new(api_key);
        Self {
            kind: ProviderKind::OpenAIResponses,
            model_name: model.to_string(),
            inner: Inner::OpenAI(client.completion_model(model)),
        }
    }

    pub fn anthropic(model: &str, api_key: &str) -> Self {
        let client = providers::anthropic::Client::new(api_key, "https://api.anthropic.com", None, "2023-06-01");
        Self {
            kind: ProviderKind::Anthropic,
            model_name: model.to_string(),
            inner: Inner::Anthropic(client.completion_model(model)),
        }
    }

    pub fn azure(model: &str, responses: bool, auth: &AzureAuth) -> Result<Self> {
        let base_url = auth.base_url.as_deref().ok_or_else(|| {
            RecipeError::config_invalid(
                "azure provider requires AZURE_OPENAI_BASE_URL (or AZURE_OPENAI_ENDPOINT)",
            )
        })?;
        let api_key = resolve_azure_api_key(auth)?;
        let client = providers::openai::Client::from_url(&api_key, base_url);
        let deployment = auth.deployment_name.as_deref().unwrap_or(model);
        Ok(Self {
            kind: if responses {
                ProviderKind::AzureResponses
            } else {
                ProviderKind::Azure
            },
            model_name: model.to_string(),
            inner: Inner::OpenAI(client.completion_model(deployment)),
        })
    }

    async fn send_once(&self, prompt: &str, tools: &[ToolDefinition]) -> Result<rig::completion::ModelChoice> {
        let provider_tag = self.provider_tag().to_string();
        let choice = match &self.inner {
            Inner::OpenAI(model) => {
                let mut request = model.completion_request(prompt);
                if !tools.is_empty() {
                    request = request.tools(tools.to_vec());
                }
                request
                    .send()
                    .await
                    .map_err(|e| RecipeError::llm_failure(&provider_tag, &self.model_name, e.to_string()))?
                    .choice
            }
            Inner::Anthropic(model) => {
                let mut request = model.completion_request(prompt);
                if !tools.is_empty() {
                    request = request.tools(tools.to_vec());
                }
                request
                    .send()
                    .await
                    .map_err(|e| RecipeError::llm_failure(&provider_tag, &self.model_name, e.to_string()))?
                    .choice
            }
        };
        Ok(choice)
    }

    /// Runs the model to completion, invoking `options.tools`/`tool_invoker`
    /// on any `ToolCall` choice and feeding the result back as a follow-up
    /// turn until the model answers with a plain message or `MAX_TOOL_TURNS`
    /// is exhausted.
    async fn completion_with_tools(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let provider_tag = self.provider_tag().to_string();
        let tool_defs: Vec<ToolDefinition> = options
            .tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name.clone(),
                description: t.description.clone().unwrap_or_default(),
                parameters: t.input_schema.clone(),
            })
            .collect();

        let mut conversation = prompt.to_string();
        for _ in 0..MAX_TOOL_TURNS {
            match self.send_once(&conversation, &tool_defs).await? {
                rig::completion::ModelChoice::Message(text) => return Ok(text),
                rig::completion::ModelChoice::ToolCall(name, params) => {
                    let invoker = options.tool_invoker.as_ref().ok_or_else(|| {
                        RecipeError::llm_failure(
                            &provider_tag,
                            &self.model_name,
                            format!("model called tool \"{name}\" but no mcp_servers tool is attached"),
                        )
                    })?;
                    let result = invoker(name.clone(), params.clone()).await.map_err(|e| {
                        RecipeError::llm_failure(&provider_tag, &self.model_name, format!("tool \"{name}\" failed: {e}"))
                    })?;
                    conversation = format!(
                        "{conversation}\n\nTool \"{name}\" was called with arguments {params} and returned: {result}\n\nContinue the response using this result."
                    );
                }
            }
        }
        Err(RecipeError::llm_failure(
            &provider_tag,
            &self.model_name,
            format!("exceeded {MAX_TOOL_TURNS} tool-call turns without a final answer"),
        ))
    }
}

/// Azure API-key auth is tried first; managed identity is documented but
/// this crate has no Azure SDK dependency, so a managed-identity token
/// fetch is out of scope and fails loudly rather than silently no-op'ing.
fn resolve_azure_api_key(auth: &AzureAuth) -> Result<String> {
    if let Some(key) = &auth.api_key {
        return Ok(key.clone());
    }
    if auth.use_managed_identity {
        return Err(RecipeError::provider_unsupported(
            "AZURE_USE_MANAGED_IDENTITY=true requires an external token provider; none is configured",
        ));
    }
    Err(RecipeError::config_invalid(
        "azure provider requires AZURE_OPENAI_API_KEY or AZURE_USE_MANAGED_IDENTITY=true",
    ))
}

fn parse_structured(raw: &str, schema: RecordSchema) -> Result<TypedRecord> {
    let cleaned = raw.trim().trim_start_matches("```json").trim_start_matches("```").trim_end_matches("```");
    let value: serde_json::Value = serde_json::from_str(cleaned.trim())
        .map_err(|e| RecipeError::schema_invalid(format!("structured output was not valid JSON: {e}")))?;
    TypedRecord::validate(schema, value)
}

#[async_trait]
impl ModelHandle for RigModelHandle {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<ModelOutput> {
        if !options.builtin_tools.is_empty() && !self.kind.supports_builtin_tools() {
            return Err(RecipeError::provider_unsupported(format!(
                "openai_builtin_tools is only supported on Responses-API providers, not {}",
                self.provider_tag()
            )));
        }

        match &options.schema {
            Some(schema) => {
                let augmented = with_schema_instructions(prompt, schema);
                let raw = self.completion_with_tools(&augmented, options).await?;
                let record = parse_structured(&raw, schema.clone())?;
                Ok(ModelOutput::Structured(record))
            }
            None => Ok(ModelOutput::Text(self.completion_with_tools(prompt, options).await?)),
        }
    }

    fn provider_tag(&self) -> &str {
        match self.kind {
            ProviderKind::OpenAI => "openai",
            ProviderKind::OpenAIResponses => "openai_responses",
            ProviderKind::Azure => "azure",
            ProviderKind::AzureResponses => "azure_responses",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_core::json_object_to_record;
    use serde_json::json;

    #[test]
    fn azure_requires_base_url() {
        let auth = AzureAuth::default();
        let err = RigModelHandle::azure("gpt-4", false, &auth).unwrap_err();
        assert!(matches!(err, RecipeError::ConfigInvalid { .. }));
    }

    #[test]
    fn azure_requires_api_key_or_managed_identity() {
        let auth = AzureAuth {
            base_url: Some("https://example.openai.azure.com".to_string()),
            ..Default::default()
        };
        let err = RigModelHandle::azure("gpt-4", false, &auth).unwrap_err();
        assert!(matches!(err, RecipeError::ConfigInvalid { .. }));
    }

    #[test]
    fn managed_identity_without_token_provider_fails() {
        let auth = AzureAuth {
            base_url: Some("https://example.openai.azure.com".to_string()),
            use_managed_identity: true,
            ..Default::default()
        };
        let err = RigModelHandle::azure("gpt-4", false, &auth).unwrap_err();
        assert!(matches!(err, RecipeError::ProviderUnsupported { .. }));
    }

    #[test]
    fn parse_structured_strips_markdown_fences() {
        let schema = json_object_to_record(
            &json!({"type": "object", "properties": {"n": {"type": "integer"}}, "required": ["n"]}),
            "Out",
        )
        .unwrap();
        let record = parse_structured("```json\n{\"n\": 3}\n```", schema).unwrap();
        assert_eq!(record.value["n"], json!(3));
    }
}
