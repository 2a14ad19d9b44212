//! ABOUTME: Provider-facing types: capabilities, env-driven config, and the ModelHandle trait

use async_trait::async_trait;
use futures::future::BoxFuture;
use recipe_core::{RecordSchema, Result, TypedRecord};
use std::env;
use std::sync::Arc;

/// Which of the six required provider kinds a `ModelSpecifier`'s `provider`
/// field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAI,
    OpenAIResponses,
    Azure,
    AzureResponses,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "openai" => Self::OpenAI,
            "openai_responses" => Self::OpenAIResponses,
            "azure" => Self::Azure,
            "azure_responses" => Self::AzureResponses,
            "anthropic" => Self::Anthropic,
            "ollama" => Self::Ollama,
            _ => return None,
        })
    }

    /// Only Responses-API providers may carry `openai_builtin_tools`.
    #[must_use]
    pub fn supports_builtin_tools(self) -> bool {
        matches!(self, Self::OpenAIResponses | Self::AzureResponses)
    }
}

/// Azure-specific credentials, resolved from environment variables per the
/// documented `AZURE_OPENAI_*` / `AZURE_*MANAGED_IDENTITY*` set.
#[derive(Debug, Clone, Default)]
pub struct AzureAuth {
    pub base_url: Option<String>,
    pub api_version: String,
    pub deployment_name: Option<String>,
    pub api_key: Option<String>,
    pub use_managed_identity: bool,
    pub managed_identity_client_id: Option<String>,
}

impl AzureAuth {
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("AZURE_OPENAI_BASE_URL")
            .ok()
            .or_else(|| env::var("AZURE_OPENAI_ENDPOINT").ok());
        let api_version = env::var("AZURE_OPENAI_API_VERSION")
            .unwrap_or_else(|_| "2025-03-01-preview".to_string());
        let use_managed_identity = env::var("AZURE_USE_MANAGED_IDENTITY")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            base_url,
            api_version,
            deployment_name: env::var("AZURE_OPENAI_DEPLOYMENT_NAME").ok(),
            api_key: env::var("AZURE_OPENAI_API_KEY").ok(),
            use_managed_identity,
            managed_identity_client_id: env::var("AZURE_MANAGED_IDENTITY_CLIENT_ID").ok(),
        }
    }
}

/// One MCP tool's identity and input shape, offered to the model as a tool
/// provider for the duration of a single `generate` call.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
}

/// Dispatches a model-requested tool call (by name, with its JSON
/// arguments) back to whichever MCP server advertised it. Returns the
/// tool's JSON result, or an error string fed back to the model as the
/// tool call's output.
pub type ToolInvoker = Arc<
    dyn Fn(String, serde_json::Value) -> BoxFuture<'static, std::result::Result<serde_json::Value, String>>
        + Send
        + Sync,
>;

/// Options controlling one `generate` call.
#[derive(Clone, Default)]
pub struct GenerateOptions {
    /// When set, the provider is asked to produce output matching this
    /// record shape and the result is validated against it.
    pub schema: Option<RecordSchema>,
    /// Builtin tool names (e.g. `"web_search"`); only valid on Responses
    /// providers per `ProviderKind::supports_builtin_tools`.
    pub builtin_tools: Vec<String>,
    /// MCP tools attached as tool providers for the call's duration.
    pub tools: Vec<ToolSpec>,
    /// Dispatches calls to any tool listed in `tools`. Required whenever
    /// `tools` is non-empty; a model's tool call with no invoker attached
    /// is a caller bug, not a provider failure.
    pub tool_invoker: Option<ToolInvoker>,
}

/// What a successful `generate` call produced.
#[derive(Debug, Clone)]
pub enum ModelOutput {
    Text(String),
    Structured(TypedRecord),
}

/// A concrete, callable model handle. One instance per `(provider, model,
/// deployment)` triple resolved by `get_model`.
#[async_trait]
pub trait ModelHandle: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<ModelOutput>;
    fn provider_tag(&self) -> &str;
    fn model_name(&self) -> &str;
}

/// Append schema-constrained output instructions to `prompt`. Rig's
/// completion API surfaces a single text/tool-call choice uniformly across
/// backends; asking the model to emit JSON matching the schema and parsing
/// the response is the portable way to get structured output across all
/// six provider kinds.
#[must_use]
pub fn with_schema_instructions(prompt: &str, schema: &RecordSchema) -> String {
    format!(
        "{prompt}\n\nRespond with a single JSON object only, matching this shape: fields {:?}, required {:?}. Do not include any prose or markdown fences.",
        schema.fields.keys().collect::<Vec<_>>(),
        schema.required
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_from_tag_covers_all_six() {
        assert_eq!(ProviderKind::from_tag("openai"), Some(ProviderKind::OpenAI));
        assert_eq!(
            ProviderKind::from_tag("openai_responses"),
            Some(ProviderKind::OpenAIResponses)
        );
        assert_eq!(ProviderKind::from_tag("azure"), Some(ProviderKind::Azure));
        assert_eq!(
            ProviderKind::from_tag("azure_responses"),
            Some(ProviderKind::AzureResponses)
        );
        assert_eq!(ProviderKind::from_tag("anthropic"), Some(ProviderKind::Anthropic));
        assert_eq!(ProviderKind::from_tag("ollama"), Some(ProviderKind::Ollama));
        assert_eq!(ProviderKind::from_tag("bogus"), None);
    }

    #[test]
    fn only_responses_providers_support_builtin_tools() {
        assert!(ProviderKind::OpenAIResponses.supports_builtin_tools());
        assert!(ProviderKind::AzureResponses.supports_builtin_tools());
        assert!(!ProviderKind::OpenAI.supports_builtin_tools());
        assert!(!ProviderKind::Azure.supports_builtin_tools());
        assert!(!ProviderKind::Anthropic.supports_builtin_tools());
        assert!(!ProviderKind::Ollama.supports_builtin_tools());
    }

    #[test]
    fn azure_api_version_defaults_when_unset() {
        let auth = AzureAuth {
            api_version: "2025-03-01-preview".to_string(),
            ..Default::default()
        };
        assert_eq!(auth.api_version, "2025-03-01-preview");
    }
}
