//! ABOUTME: McpServerDescriptor — validated server config for get_mcp_server
//! ABOUTME: Exactly one of url/command; stdio env values resolve against the process environment

use recipe_core::{RecipeError, Result};
use std::collections::HashMap;

const SENSITIVE_MARKERS: &[&str] = &["key", "token", "secret", "password", "authorization"];

/// Either an HTTP(SSE) or a stdio MCP server to connect to. Constructed from
/// recipe config and validated before any connection is attempted.
#[derive(Debug, Clone, Default)]
pub struct McpServerDescriptor {
    pub name: String,
    pub url: Option<String>,
    pub headers: HashMap<String, String>,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub working_dir: Option<String>,
}

impl McpServerDescriptor {
    /// A server descriptor's `name` is caller-friendly debugging metadata,
    /// not part of the spec's wire shape; callers that omit it synthesize
    /// one from whichever transport field identifies the server.
    #[must_use]
    pub fn synthesize_name(url: Option<&str>, command: Option<&str>) -> String {
        url.or(command).unwrap_or("mcp-server").to_string()
    }

    /// Validate that exactly one transport (`url` xor `command`) is set.
    pub fn validate(&self) -> Result<()> {
        match (&self.url, &self.command) {
            (Some(_), Some(_)) => Err(RecipeError::config_invalid(format!(
                "mcp server \"{}\": exactly one of url or command is allowed, both given",
                self.name
            ))),
            (None, None) => Err(RecipeError::config_invalid(format!(
                "mcp server \"{}\": exactly one of url or command is required",
                self.name
            ))),
            _ => Ok(()),
        }
    }

    pub fn is_stdio(&self) -> bool {
        self.command.is_some()
    }

    /// Resolve empty-string env values against the process environment;
    /// non-empty values (and unresolved empty ones) pass through unchanged.
    #[must_use]
    pub fn resolved_env(&self) -> HashMap<String, String> {
        self.env
            .iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    let resolved = std::env::var(k).unwrap_or_default();
                    (k.clone(), resolved)
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect()
    }

    /// Render a debug-safe summary with sensitive env values masked.
    #[must_use]
    pub fn masked_debug(&self) -> String {
        let masked_env: HashMap<&String, String> = self
            .env
            .iter()
            .map(|(k, v)| {
                let lower = k.to_lowercase();
                if SENSITIVE_MARKERS.iter().any(|m| lower.contains(m)) {
                    (k, "****".to_string())
                } else {
                    (k, v.clone())
                }
            })
            .collect();
        format!(
            "McpServerDescriptor {{ name: {:?}, url: {:?}, headers: <{} masked>, command: {:?}, args: {:?}, env: {:?}, working_dir: {:?} }}",
            self.name,
            self.url,
            self.headers.len(),
            self.command,
            self.args,
            masked_env,
            self.working_dir
        )
    }
}
