//! ABOUTME: set_context step — renders a value and writes it into the context

use async_trait::async_trait;
use recipe_core::{Context, IfExists, RecipeError, Result, Step};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Config {
    key: String,
    value: Value,
    #[serde(default)]
    nested_render: bool,
    #[serde(default)]
    if_exists: Option<String>,
}

pub struct SetContext {
    config: Config,
}

impl SetContext {
    pub fn from_config(config: Value) -> Result<Box<dyn Step>> {
        let config: Config = serde_json::from_value(config)
            .map_err(|e| RecipeError::config_invalid(format!("set_context: {e}")))?;
        Ok(Box::new(Self { config }))
    }
}

#[async_trait]
impl Step for SetContext {
    async fn execute(&self, context: &mut Context) -> Result<()> {
        let if_exists = match self.config.if_exists.as_deref() {
            None | Some("overwrite") => IfExists::Overwrite,
            Some("merge") => IfExists::Merge,
            Some(other) => {
                return Err(RecipeError::config_invalid(format!(
                    "set_context: unknown if_exists \"{other}\""
                )))
            }
        };

        let rendered = if self.config.nested_render {
            recipe_templates::render_value_nested(&self.config.value, context)?
        } else {
            recipe_templates::render_value(&self.config.value, context)?
        };

        context.set_with(self.config.key.clone(), rendered, if_exists)
    }
}
