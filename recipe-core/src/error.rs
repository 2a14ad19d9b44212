//! ABOUTME: Error types and handling for the recipe executor
//! ABOUTME: Provides RecipeError enum, Result alias, and step-path annotation

use std::fmt;
use thiserror::Error;

/// One segment of a recipe-relative path, e.g. the `3` in `/steps/3/substeps/1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepPathSegment {
    Steps(usize),
    Substeps(usize),
}

/// A recipe-relative location, rendered as `/steps/3/substeps/1`.
///
/// Built up by the Executor as it recurses into `loop`/`parallel`/`conditional`
/// substeps, so a failure deep inside a sub-recipe still names the exact step
/// that raised it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepPath(Vec<StepPathSegment>);

impl StepPath {
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn child_step(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(StepPathSegment::Steps(index));
        Self(segments)
    }

    #[must_use]
    pub fn child_substep(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(StepPathSegment::Substeps(index));
        Self(segments)
    }
}

impl fmt::Display for StepPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.0 {
            match segment {
                StepPathSegment::Steps(i) => write!(f, "/steps/{i}")?,
                StepPathSegment::Substeps(i) => write!(f, "/substeps/{i}")?,
            }
        }
        Ok(())
    }
}

/// Comprehensive error enum for all recipe executor operations.
///
/// Every variant mirrors one of the error kinds named by the engine's error
/// handling design: `ConfigInvalid`, `KeyMissing`, `TemplateError`,
/// `IOFailure`, `SchemaInvalid`, `ProviderUnsupported`, `LLMFailure`,
/// `ToolCallFailure`, `StepUnknown`.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("config invalid{}: {message}", path_suffix(.step_path))]
    ConfigInvalid {
        message: String,
        step_path: Option<StepPath>,
    },

    #[error("key missing: {key}")]
    KeyMissing { key: String },

    #[error("template error in \"{truncated_template}\": {cause}")]
    TemplateError {
        truncated_template: String,
        cause: String,
    },

    #[error("io failure at {path}: {cause}")]
    IOFailure { path: String, cause: String },

    #[error("schema invalid: {message}")]
    SchemaInvalid { message: String },

    #[error("provider unsupported: {message}")]
    ProviderUnsupported { message: String },

    #[error("llm call failed ({provider}/{model}): {cause}")]
    LLMFailure {
        provider: String,
        model: String,
        cause: String,
    },

    #[error("tool call failed (server={server}, tool={tool}): {cause}")]
    ToolCallFailure {
        server: String,
        tool: String,
        cause: String,
    },

    #[error("step unknown: \"{step_type}\"{}", path_suffix(.step_path))]
    StepUnknown {
        step_type: String,
        step_path: Option<StepPath>,
    },
}

fn path_suffix(path: &Option<StepPath>) -> String {
    match path {
        Some(p) => format!(" at {p}"),
        None => String::new(),
    }
}

impl RecipeError {
    /// Attach (or overwrite) the step path on errors that carry one.
    ///
    /// Errors without a `step_path` field (e.g. `KeyMissing`) are returned
    /// unchanged; the Executor still reports the path to the caller
    /// separately in that case.
    #[must_use]
    pub fn with_step_path(mut self, path: StepPath) -> Self {
        match &mut self {
            Self::ConfigInvalid { step_path, .. } | Self::StepUnknown { step_path, .. } => {
                *step_path = Some(path);
            }
            _ => {}
        }
        self
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            message: message.into(),
            step_path: None,
        }
    }

    pub fn key_missing(key: impl Into<String>) -> Self {
        Self::KeyMissing { key: key.into() }
    }

    pub fn template_error(template: &str, cause: impl Into<String>) -> Self {
        const MAX_LEN: usize = 120;
        let truncated_template = if template.chars().count() > MAX_LEN {
            let mut s: String = template.chars().take(MAX_LEN).collect();
            s.push('\u{2026}');
            s
        } else {
            template.to_string()
        };
        Self::TemplateError {
            truncated_template,
            cause: cause.into(),
        }
    }

    pub fn io_failure(path: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::IOFailure {
            path: path.into(),
            cause: cause.into(),
        }
    }

    pub fn schema_invalid(message: impl Into<String>) -> Self {
        Self::SchemaInvalid {
            message: message.into(),
        }
    }

    pub fn provider_unsupported(message: impl Into<String>) -> Self {
        Self::ProviderUnsupported {
            message: message.into(),
        }
    }

    pub fn llm_failure(
        provider: impl Into<String>,
        model: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self::LLMFailure {
            provider: provider.into(),
            model: model.into(),
            cause: cause.into(),
        }
    }

    pub fn tool_call_failure(
        server: impl Into<String>,
        tool: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self::ToolCallFailure {
            server: server.into(),
            tool: tool.into(),
            cause: cause.into(),
        }
    }

    pub fn step_unknown(step_type: impl Into<String>) -> Self {
        Self::StepUnknown {
            step_type: step_type.into(),
            step_path: None,
        }
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, RecipeError>;
