//! ABOUTME: FileSpec — a {path, content} record describing one file to write
//! ABOUTME: Structured content is serialized as indented JSON at write time

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One file to write. `content` is either a plain string (written verbatim)
/// or a JSON object/array (serialized as indented JSON, UTF-8, no BOM).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileSpec {
    pub path: String,
    pub content: Value,
}

impl FileSpec {
    #[must_use]
    pub fn new(path: impl Into<String>, content: Value) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }

    /// Render `content` to the bytes that should actually be written:
    /// strings verbatim, objects/arrays as indent-2 JSON.
    #[must_use]
    pub fn rendered_content(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_default(),
        }
    }

    /// Parse a single `FileSpec`, or a list of them, from a `Context` value
    /// (what `write_files`' `files_key` points at).
    #[must_use]
    pub fn from_value(value: &Value) -> Vec<FileSpec> {
        match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            single => serde_json::from_value(single.clone())
                .map(|spec: FileSpec| vec![spec])
                .unwrap_or_default(),
        }
    }
}
