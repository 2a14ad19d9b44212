//! ABOUTME: read_files step — load one or more files' text into the context

use async_trait::async_trait;
use recipe_core::{Context, RecipeError, Result, Step};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Config {
    path: Value,
    content_key: String,
    #[serde(default)]
    merge_mode: Option<String>,
    #[serde(default)]
    optional: bool,
}

pub struct ReadFiles {
    config: Config,
}

impl ReadFiles {
    pub fn from_config(config: Value) -> Result<Box<dyn Step>> {
        let config: Config = serde_json::from_value(config)
            .map_err(|e| RecipeError::config_invalid(format!("read_files: {e}")))?;
        Ok(Box::new(Self { config }))
    }
}

fn resolve_paths(path_value: &Value, context: &Context) -> Result<Vec<String>> {
    match path_value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let s = item
                    .as_str()
                    .ok_or_else(|| RecipeError::config_invalid("read_files: path list entries must be strings"))?;
                recipe_templates::render(s, context)
            })
            .collect(),
        Value::String(s) => {
            let rendered = recipe_templates::render(s, context)?;
            Ok(rendered.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect())
        }
        _ => Err(RecipeError::config_invalid("read_files: path must be a string or list of strings")),
    }
}

fn file_stem(path: &str) -> String {
    std::path::Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn read_one(path: &str, optional: bool) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if optional && e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(RecipeError::io_failure(path, e.to_string())),
    }
}

#[async_trait]
impl Step for ReadFiles {
    async fn execute(&self, context: &mut Context) -> Result<()> {
        let paths = resolve_paths(&self.config.path, context)?;
        let merge_mode = self.config.merge_mode.as_deref().unwrap_or("concat");

        let value = match merge_mode {
            "concat" => {
                let mut contents = Vec::with_capacity(paths.len());
                for path in &paths {
                    contents.push(read_one(path, self.config.optional)?);
                }
                Value::String(contents.join("\n"))
            }
            "dict" => {
                let mut map = serde_json::Map::new();
                for path in &paths {
                    let content = read_one(path, self.config.optional)?;
                    map.insert(file_stem(path), Value::String(content));
                }
                Value::Object(map)
            }
            other => {
                return Err(RecipeError::config_invalid(format!(
                    "read_files: unknown merge_mode \"{other}\""
                )))
            }
        };

        context.set(self.config.content_key.clone(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_single_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spec.txt");
        std::fs::write(&path, "print hello").unwrap();

        let step = ReadFiles::from_config(json!({
            "path": path.to_str().unwrap(),
            "content_key": "spec"
        }))
        .unwrap();
        let mut ctx = Context::new();
        step.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.get("spec"), Some(&json!("print hello")));
    }

    #[tokio::test]
    async fn concat_mode_joins_with_newlines() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "A").unwrap();
        std::fs::write(&b, "B").unwrap();

        let step = ReadFiles::from_config(json!({
            "path": [a.to_str().unwrap(), b.to_str().unwrap()],
            "content_key": "out"
        }))
        .unwrap();
        let mut ctx = Context::new();
        step.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.get("out"), Some(&json!("A\nB")));
    }

    #[tokio::test]
    async fn dict_mode_preserves_input_path_order_not_alphabetical() {
        let dir = tempdir().unwrap();
        // Alphabetical order would be alpha, mid, zeta; input order is the reverse.
        let zeta = dir.path().join("zeta.txt");
        let mid = dir.path().join("mid.txt");
        let alpha = dir.path().join("alpha.txt");
        std::fs::write(&zeta, "Z").unwrap();
        std::fs::write(&mid, "M").unwrap();
        std::fs::write(&alpha, "A").unwrap();

        let step = ReadFiles::from_config(json!({
            "path": [zeta.to_str().unwrap(), mid.to_str().unwrap(), alpha.to_str().unwrap()],
            "content_key": "out",
            "merge_mode": "dict"
        }))
        .unwrap();
        let mut ctx = Context::new();
        step.execute(&mut ctx).await.unwrap();

        let out = ctx.get("out").unwrap().as_object().unwrap();
        let keys: Vec<&String> = out.keys().collect();
        assert_eq!(keys, vec!["zeta", "mid", "alpha"]);
    }

    #[tokio::test]
    async fn dict_mode_keys_by_file_stem() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        std::fs::write(&a, "A").unwrap();

        let step = ReadFiles::from_config(json!({
            "path": [a.to_str().unwrap()],
            "content_key": "out",
            "merge_mode": "dict"
        }))
        .unwrap();
        let mut ctx = Context::new();
        step.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.get("out"), Some(&json!({"a": "A"})));
    }

    #[tokio::test]
    async fn optional_missing_file_stores_empty_string() {
        let step = ReadFiles::from_config(json!({
            "path": "/definitely/missing/path.txt",
            "content_key": "out",
            "optional": true
        }))
        .unwrap();
        let mut ctx = Context::new();
        step.execute(&mut ctx).await.unwrap();
        assert_eq!(ctx.get("out"), Some(&json!("")));
    }

    #[tokio::test]
    async fn missing_file_without_optional_fails() {
        let step = ReadFiles::from_config(json!({
            "path": "/definitely/missing/path.txt",
            "content_key": "out"
        }))
        .unwrap();
        let mut ctx = Context::new();
        let err = step.execute(&mut ctx).await.unwrap_err();
        assert!(matches!(err, RecipeError::IOFailure { .. }));
    }
}
