//! ABOUTME: McpClient — opens a fresh session per call, never pools, per the stateless-MCP design note
//! ABOUTME: Wraps rmcp's SSE and child-process transports behind one listing/calling surface

use crate::descriptor::McpServerDescriptor;
use recipe_core::{RecipeError, Result};
use rmcp::model::CallToolRequestParam;
use rmcp::transport::{ConfigureCommandExt, SseClientTransport, TokioChildProcess};
use rmcp::ServiceExt;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

/// One MCP tool's name and JSON-Schema input shape, as advertised by the server.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// A non-persistent MCP client bound to one server descriptor. Every
/// `list_tools`/`call_tool` opens, uses, and tears down its own session.
pub struct McpClient {
    descriptor: McpServerDescriptor,
}

impl McpClient {
    pub fn new(descriptor: McpServerDescriptor) -> Result<Self> {
        descriptor.validate()?;
        Ok(Self { descriptor })
    }

    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        debug!(server = %self.descriptor.masked_debug(), "mcp: listing tools");
        let service = self.connect().await?;
        let result = service
            .list_tools(None)
            .await
            .map_err(|e| self.tool_call_failure("<list_tools>", e.to_string()))?;
        let _ = service.cancel().await;

        Ok(result
            .tools
            .into_iter()
            .map(|t| ToolDescriptor {
                name: t.name.to_string(),
                description: t.description.map(|d| d.to_string()),
                input_schema: Value::Object((*t.input_schema).clone()),
            })
            .collect())
    }

    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<Value> {
        debug!(server = %self.descriptor.masked_debug(), tool = tool_name, "mcp: calling tool");
        let service = self.connect().await?;
        let args_map = arguments.as_object().cloned();
        let result = service
            .call_tool(CallToolRequestParam {
                name: tool_name.to_string().into(),
                arguments: args_map,
            })
            .await
            .map_err(|e| self.tool_call_failure(tool_name, e.to_string()))?;
        let _ = service.cancel().await;

        serde_json::to_value(&result.content)
            .map_err(|e| self.tool_call_failure(tool_name, e.to_string()))
    }

    async fn connect(&self) -> Result<rmcp::service::RunningService<rmcp::RoleClient, ()>> {
        if let Some(url) = &self.descriptor.url {
            let transport = if self.descriptor.headers.is_empty() {
                SseClientTransport::start(url.clone())
                    .await
                    .map_err(|e| self.tool_call_failure("<connect>", e.to_string()))?
            } else {
                let http_client = self.build_http_client()?;
                SseClientTransport::start_with_client(http_client, url.clone())
                    .await
                    .map_err(|e| self.tool_call_failure("<connect>", e.to_string()))?
            };
            ().serve(transport)
                .await
                .map_err(|e| self.tool_call_failure("<connect>", e.to_string()))
        } else {
            let command = self
                .descriptor
                .command
                .as_ref()
                .expect("validate() guarantees command is set when url is None");
            let resolved_env = self.descriptor.resolved_env();
            let args = self.descriptor.args.clone();
            let working_dir = self.descriptor.working_dir.clone();
            let transport = TokioChildProcess::new(Command::new(command).configure(|cmd| {
                cmd.args(&args);
                for (k, v) in &resolved_env {
                    cmd.env(k, v);
                }
                if let Some(dir) = &working_dir {
                    cmd.current_dir(dir);
                }
            }))
            .map_err(|e| self.tool_call_failure("<connect>", e.to_string()))?;
            ().serve(transport)
                .await
                .map_err(|e| self.tool_call_failure("<connect>", e.to_string()))
        }
    }

    /// Build a client carrying the descriptor's static HTTP headers
    /// (e.g. `Authorization`) for the SSE transport.
    fn build_http_client(&self) -> Result<reqwest::Client> {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in &self.descriptor.headers {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| self.tool_call_failure("<connect>", format!("invalid header name \"{key}\": {e}")))?;
            let value = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| self.tool_call_failure("<connect>", format!("invalid header value for \"{key}\": {e}")))?;
            header_map.insert(name, value);
        }
        reqwest::Client::builder()
            .default_headers(header_map)
            .build()
            .map_err(|e| self.tool_call_failure("<connect>", e.to_string()))
    }

    fn tool_call_failure(&self, tool: &str, cause: impl Into<String>) -> RecipeError {
        RecipeError::tool_call_failure(&self.descriptor.name, tool, cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_descriptor_at_construction() {
        let descriptor = McpServerDescriptor {
            name: "broken".to_string(),
            ..Default::default()
        };
        let err = McpClient::new(descriptor).unwrap_err();
        assert!(matches!(err, RecipeError::ConfigInvalid { .. }));
    }

    #[tokio::test]
    async fn connect_failure_wraps_into_tool_call_failure() {
        let descriptor = McpServerDescriptor {
            name: "unreachable".to_string(),
            url: Some("http://127.0.0.1:1/sse".to_string()),
            ..Default::default()
        };
        let client = McpClient::new(descriptor).unwrap();
        let err = client.list_tools().await.unwrap_err();
        assert!(matches!(err, RecipeError::ToolCallFailure { server, .. } if server == "unreachable"));
    }
}
