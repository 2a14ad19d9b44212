//! ABOUTME: llm_generate step — prompt rendering, provider routing, structured output coercion
//! ABOUTME: MCP servers/builtin tools are attached for the duration of one call

use async_trait::async_trait;
use futures::future::BoxFuture;
use recipe_core::{json_object_to_record, Context, FileSpec, RecipeError, Result, Step};
use recipe_mcp::McpServerDescriptor;
use recipe_providers::{GenerateOptions, ModelHandle, ModelOutput, ToolInvoker, ToolSpec};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

const FILES_SCHEMA_NAME: &str = "LlmGenerateFiles";

#[derive(Debug, Deserialize)]
struct McpServerConfig {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    working_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Config {
    prompt: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    output_format: Option<Value>,
    output_key: String,
    #[serde(default)]
    mcp_servers: Vec<McpServerConfig>,
    #[serde(default)]
    openai_builtin_tools: Vec<Value>,
}

pub struct LlmGenerate {
    config: Config,
}

impl LlmGenerate {
    pub fn from_config(config: Value) -> Result<Box<dyn Step>> {
        let config: Config = serde_json::from_value(config)
            .map_err(|e| RecipeError::config_invalid(format!("llm_generate: {e}")))?;
        Ok(Box::new(Self { config }))
    }
}

fn files_schema() -> recipe_core::RecordSchema {
    json_object_to_record(
        &serde_json::json!({
            "type": "object",
            "properties": {
                "files": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "path": {"type": "string"},
                            "content": {"type": "string"}
                        },
                        "required": ["path", "content"]
                    }
                }
            },
            "required": ["files"]
        }),
        FILES_SCHEMA_NAME,
    )
    .expect("files schema is a fixed, valid literal")
}

/// Render one server's `McpServerConfig` into a connectable descriptor.
fn render_server_descriptor(server: &McpServerConfig, context: &Context) -> Result<McpServerDescriptor> {
    let url = server.url.as_ref().map(|u| recipe_templates::render(u, context)).transpose()?;
    let command = server
        .command
        .as_ref()
        .map(|c| recipe_templates::render(c, context))
        .transpose()?;
    let name = match &server.name {
        Some(name) => recipe_templates::render(name, context)?,
        None => McpServerDescriptor::synthesize_name(url.as_deref(), command.as_deref()),
    };
    Ok(McpServerDescriptor {
        name,
        url,
        headers: server.headers.clone(),
        command,
        args: server
            .args
            .iter()
            .map(|a| recipe_templates::render(a, context))
            .collect::<Result<Vec<_>>>()?,
        env: server.env.clone(),
        working_dir: server
            .working_dir
            .as_ref()
            .map(|d| recipe_templates::render(d, context))
            .transpose()?,
    })
}

/// Lists every attached server's tools and builds the `ToolSpec`s plus an
/// invoker that dispatches a model-requested call back to whichever server
/// advertised it.
async fn attach_mcp_tools(
    servers: &[McpServerConfig],
    context: &Context,
) -> Result<(Vec<ToolSpec>, Option<ToolInvoker>)> {
    if servers.is_empty() {
        return Ok((Vec::new(), None));
    }

    let mut tool_specs = Vec::new();
    let mut tool_owners: HashMap<String, McpServerDescriptor> = HashMap::new();
    for server in servers {
        let descriptor = render_server_descriptor(server, context)?;
        let client = recipe_mcp::get_mcp_server(descriptor.clone())?;
        for tool in client.list_tools().await? {
            tool_owners.insert(tool.name.clone(), descriptor.clone());
            tool_specs.push(ToolSpec {
                name: tool.name,
                description: tool.description,
                input_schema: tool.input_schema,
            });
        }
    }

    let tool_owners = Arc::new(tool_owners);
    let invoker: ToolInvoker = Arc::new(move |name: String, arguments: Value| {
        let tool_owners = tool_owners.clone();
        Box::pin(async move {
            let descriptor = tool_owners
                .get(&name)
                .ok_or_else(|| format!("no attached mcp_servers tool named \"{name}\""))?
                .clone();
            let client = recipe_mcp::get_mcp_server(descriptor).map_err(|e| e.to_string())?;
            client.call_tool(&name, arguments).await.map_err(|e| e.to_string())
        }) as BoxFuture<'static, std::result::Result<Value, String>>
    });

    Ok((tool_specs, Some(invoker)))
}

#[async_trait]
impl Step for LlmGenerate {
    async fn execute(&self, context: &mut Context) -> Result<()> {
        let model_identifier = match &self.config.model {
            Some(m) => recipe_templates::render(m, context)?,
            None => std::env::var("MODEL_NAME")
                .map_err(|_| RecipeError::config_invalid("llm_generate: no model configured and MODEL_NAME is unset"))?,
        };
        let model = recipe_providers::get_model(&model_identifier)?;
        self.generate_and_store(model.as_ref(), context).await
    }
}

impl LlmGenerate {
    /// Renders the prompt, attaches any `mcp_servers` tools, calls `model`,
    /// and stores the result per `output_format`. Split out from `execute`
    /// so tests can drive it with a stub `ModelHandle` instead of a real
    /// provider.
    async fn generate_and_store(&self, model: &dyn ModelHandle, context: &mut Context) -> Result<()> {
        let prompt = recipe_templates::render(&self.config.prompt, context)?;
        let (tools, tool_invoker) = attach_mcp_tools(&self.config.mcp_servers, context).await?;

        if !self.config.openai_builtin_tools.is_empty() && !model.provider_tag().ends_with("_responses") {
            return Err(RecipeError::provider_unsupported(format!(
                "openai_builtin_tools requires a Responses-API provider, got \"{}\"",
                model.provider_tag()
            )));
        }
        let builtin_tools: Vec<String> = self
            .config
            .openai_builtin_tools
            .iter()
            .map(|t| t.as_str().map(str::to_string).unwrap_or_else(|| t.to_string()))
            .collect();

        let format_tag = self.config.output_format.as_ref().and_then(Value::as_str);

        if self.config.output_format.is_none() || format_tag == Some("text") {
            let options = GenerateOptions {
                schema: None,
                builtin_tools,
                tools,
                tool_invoker,
            };
            let output = model.generate(&prompt, &options).await?;
            let text = match output {
                ModelOutput::Text(t) => t,
                ModelOutput::Structured(record) => record.value.to_string(),
            };
            context.set(self.config.output_key.clone(), Value::String(text));
        } else if format_tag == Some("files") {
            let options = GenerateOptions {
                schema: Some(files_schema()),
                builtin_tools,
                tools,
                tool_invoker,
            };
            let output = model.generate(&prompt, &options).await?;
            let record = match output {
                ModelOutput::Structured(record) => record,
                ModelOutput::Text(_) => {
                    return Err(RecipeError::schema_invalid(
                        "llm_generate: output_format=files requires structured output",
                    ))
                }
            };
            let files = record.value.get("files").cloned().unwrap_or_else(|| Value::Array(vec![]));
            let specs = FileSpec::from_value(&files);
            let value = serde_json::to_value(&specs).unwrap_or(Value::Array(vec![]));
            context.set(self.config.output_key.clone(), value);
        } else if self.config.output_format.as_ref().is_some_and(Value::is_object) {
            let schema_value = self.config.output_format.as_ref().unwrap();
            let schema = json_object_to_record(schema_value, "LlmGenerateOutput")?;
            let options = GenerateOptions {
                schema: Some(schema),
                builtin_tools,
                tools,
                tool_invoker,
            };
            let output = model.generate(&prompt, &options).await?;
            let record = match output {
                ModelOutput::Structured(record) => record,
                ModelOutput::Text(_) => {
                    return Err(RecipeError::schema_invalid(
                        "llm_generate: schema output_format requires structured output",
                    ))
                }
            };
            context.set(self.config.output_key.clone(), record.value);
        } else {
            return Err(RecipeError::config_invalid(format!(
                "llm_generate: invalid output_format {:?}",
                self.config.output_format
            )));
        }

        Ok(())
    }
}
