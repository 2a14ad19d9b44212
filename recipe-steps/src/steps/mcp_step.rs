//! ABOUTME: mcp step — calls one tool on an MCP server and stores the normalized result

use async_trait::async_trait;
use recipe_core::{Context, RecipeError, Result, Step};
use recipe_mcp::McpServerDescriptor;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ServerConfig {
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
    server: ServerConfig,
    tool_name: String,
    #[serde(default)]
    arguments: Value,
    result_key: String,
}

pub struct McpStep {
    config: Config,
}

impl McpStep {
    pub fn from_config(config: Value) -> Result<Box<dyn Step>> {
        let config: Config = serde_json::from_value(config)
            .map_err(|e| RecipeError::config_invalid(format!("mcp: {e}")))?;
        Ok(Box::new(Self { config }))
    }
}

fn render_descriptor(server: &ServerConfig, context: &Context) -> Result<McpServerDescriptor> {
    let url = server
        .url
        .as_ref()
        .map(|u| recipe_templates::render(u, context))
        .transpose()?;
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

#[async_trait]
impl Step for McpStep {
    async fn execute(&self, context: &mut Context) -> Result<()> {
        let descriptor = render_descriptor(&self.config.server, context)?;
        let tool_name = recipe_templates::render(&self.config.tool_name, context)?;
        let arguments = recipe_templates::render_value(&self.config.arguments, context)?;

        let client = recipe_mcp::get_mcp_server(descriptor)?;
        let result = client.call_tool(&tool_name, arguments).await?;

        let normalized = match result {
            Value::Object(_) => result,
            other => serde_json::json!({ "result": other }),
        };
        context.set(self.config.result_key.clone(), normalized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_malformed_config() {
        let err = McpStep::from_config(json!({"server": {"name": "s"}})).unwrap_err();
        assert!(matches!(err, RecipeError::ConfigInvalid { .. }));
    }

    #[test]
    fn render_descriptor_synthesizes_name_when_omitted() {
        let server = ServerConfig {
            name: None,
            url: Some("http://example.invalid/sse".to_string()),
            headers: HashMap::new(),
            command: None,
            args: vec![],
            env: HashMap::new(),
            working_dir: None,
        };
        let ctx = Context::new();
        let descriptor = render_descriptor(&server, &ctx).unwrap();
        assert_eq!(descriptor.name, "http://example.invalid/sse");
    }

    #[tokio::test]
    async fn unreachable_server_surfaces_tool_call_failure() {
        let step = McpStep::from_config(json!({
            "server": {"name": "s", "url": "http://127.0.0.1:1/sse"},
            "tool_name": "search",
            "arguments": {},
            "result_key": "out"
        }))
        .unwrap();
        let mut ctx = Context::new();
        let err = step.execute(&mut ctx).await.unwrap_err();
        assert!(matches!(err, RecipeError::ToolCallFailure { .. }));
    }
}
