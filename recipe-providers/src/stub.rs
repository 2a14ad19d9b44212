//! ABOUTME: StubModelHandle — a fixed-output ModelHandle for exercising llm_generate end to end
//! ABOUTME: without a real provider; mirrors the plain-struct mock pattern used for state/events

use crate::abstraction::{GenerateOptions, ModelHandle, ModelOutput};
use async_trait::async_trait;
use recipe_core::{Result, TypedRecord};
use serde_json::Value;

/// Always returns the same configured output, structured when a schema is
/// requested and text otherwise. Lets step tests drive `output_format`
/// dispatch and schema coercion without a network call.
pub struct StubModelHandle {
    model_name: String,
    output: Value,
}

impl StubModelHandle {
    #[must_use]
    pub fn new(model_name: impl Into<String>, output: Value) -> Self {
        Self {
            model_name: model_name.into(),
            output,
        }
    }
}

#[async_trait]
impl ModelHandle for StubModelHandle {
    async fn generate(&self, _prompt: &str, options: &GenerateOptions) -> Result<ModelOutput> {
        match &options.schema {
            Some(schema) => {
                let record = TypedRecord::validate(schema.clone(), self.output.clone())?;
                Ok(ModelOutput::Structured(record))
            }
            None => {
                let text = match &self.output {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Ok(ModelOutput::Text(text))
            }
        }
    }

    fn provider_tag(&self) -> &str {
        "stub"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
