//! ABOUTME: recipe-mcp — stateless MCP client: descriptor validation plus HTTP(SSE)/stdio transports
//! ABOUTME: get_mcp_server is the single entry point the mcp step and llm_generate's tool attachment call

mod client;
mod descriptor;

pub use client::{McpClient, ToolDescriptor};
pub use descriptor::McpServerDescriptor;
use recipe_core::Result;

/// Construct a non-persistent client bound to `descriptor`'s transport.
/// Validates the descriptor up front; no connection is opened until the
/// first `list_tools`/`call_tool`.
pub fn get_mcp_server(descriptor: McpServerDescriptor) -> Result<McpClient> {
    McpClient::new(descriptor)
}
