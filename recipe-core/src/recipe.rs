//! ABOUTME: Recipe and StepDef — the JSON shape an Executor parses and runs
//! ABOUTME: A Recipe is just an ordered list of typed, config-carrying steps

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step in a recipe: a registered `type` name plus its per-step config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDef {
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub config: Value,
}

/// An ordered list of steps, parsed from a recipe JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Recipe {
    pub steps: Vec<StepDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_vars: Option<Vec<String>>,
}

impl Recipe {
    /// Parse a recipe from its JSON text form.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_recipe() {
        let recipe = Recipe::parse(
            r#"{"steps": [{"type": "set_context", "config": {"key": "a", "value": 1}}]}"#,
        )
        .unwrap();
        assert_eq!(recipe.steps.len(), 1);
        assert_eq!(recipe.steps[0].step_type, "set_context");
        assert!(recipe.env_vars.is_none());
    }

    #[test]
    fn parses_env_vars() {
        let recipe =
            Recipe::parse(r#"{"steps": [], "env_vars": ["OPENAI_API_KEY"]}"#).unwrap();
        assert_eq!(recipe.env_vars, Some(vec!["OPENAI_API_KEY".to_string()]));
    }

    #[test]
    fn step_without_config_defaults_to_null() {
        let recipe = Recipe::parse(r#"{"steps": [{"type": "noop"}]}"#).unwrap();
        assert_eq!(recipe.steps[0].config, Value::Null);
    }
}
