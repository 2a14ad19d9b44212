//! ABOUTME: write_files step — serializes FileSpecs to disk, creating parent directories

use async_trait::async_trait;
use recipe_core::{Context, FileSpec, RecipeError, Result, Step};
use serde_json::Value;
use tracing::debug;

pub struct WriteFiles {
    config: Value,
}

impl WriteFiles {
    pub fn from_config(config: Value) -> Result<Box<dyn Step>> {
        if !config.is_object() {
            return Err(RecipeError::config_invalid("write_files: config must be an object"));
        }
        Ok(Box::new(Self { config }))
    }
}

fn collect_file_specs(config: &Value, context: &Context) -> Result<Vec<FileSpec>> {
    if let Some(key) = config.get("files_key").and_then(Value::as_str) {
        let value = context.get_required(key)?;
        return Ok(FileSpec::from_value(value));
    }

    if let Some(entries) = config.get("files").and_then(Value::as_array) {
        let mut specs = Vec::with_capacity(entries.len());
        for entry in entries {
            let path = entry
                .get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| RecipeError::config_invalid("write_files: file entry missing \"path\""))?
                .to_string();
            let content = if let Some(content_key) = entry.get("content_key").and_then(Value::as_str) {
                context.get_required(content_key)?.clone()
            } else {
                entry
                    .get("content")
                    .cloned()
                    .ok_or_else(|| RecipeError::config_invalid("write_files: file entry missing \"content\""))?
            };
            specs.push(FileSpec::new(path, content));
        }
        return Ok(specs);
    }

    Err(RecipeError::config_invalid(
        "write_files: config must set exactly one of \"files_key\" or \"files\"",
    ))
}

#[async_trait]
impl Step for WriteFiles {
    async fn execute(&self, context: &mut Context) -> Result<()> {
        let specs = collect_file_specs(&self.config, context)?;
        let root = self
            .config
            .get("root")
            .and_then(Value::as_str)
            .map(|r| recipe_templates::render(r, context))
            .transpose()?;

        for spec in specs {
            let rendered_path = recipe_templates::render(&spec.path, context)?;
            let full_path = match &root {
                Some(root) => std::path::Path::new(root).join(&rendered_path),
                None => std::path::PathBuf::from(&rendered_path),
            };

            let content = match &spec.content {
                Value::String(s) => Value::String(recipe_templates::render(s, context)?),
                other => other.clone(),
            };
            let rendered = FileSpec::new(rendered_path.clone(), content).rendered_content();

            if let Some(parent) = full_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| RecipeError::io_failure(full_path.display().to_string(), e.to_string()))?;
                }
            }
            std::fs::write(&full_path, rendered)
                .map_err(|e| RecipeError::io_failure(full_path.display().to_string(), e.to_string()))?;
            debug!(path = %full_path.display(), "write_files: wrote file");
        }

        Ok(())
    }
}
