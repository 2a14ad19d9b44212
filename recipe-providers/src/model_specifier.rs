//! ABOUTME: ModelSpecifier — parses the `provider/name[/deployment]` model identifier syntax

use recipe_core::{RecipeError, Result};

/// A parsed `provider/name[/deployment]` model identifier.
///
/// `deployment` is only meaningful for the Azure providers, where it names
/// the Azure deployment to call (distinct from the underlying model name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpecifier {
    pub provider: String,
    pub name: String,
    pub deployment: Option<String>,
}

impl ModelSpecifier {
    /// Parse `identifier`, splitting on `/` into `(provider, name[, deployment])`.
    pub fn parse(identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(RecipeError::config_invalid("model identifier cannot be empty"));
        }

        let parts: Vec<&str> = identifier.split('/').collect();
        match parts.as_slice() {
            [provider, name] => Ok(Self {
                provider: (*provider).to_string(),
                name: (*name).to_string(),
                deployment: None,
            }),
            [provider, name, deployment] => Ok(Self {
                provider: (*provider).to_string(),
                name: (*name).to_string(),
                deployment: Some((*deployment).to_string()),
            }),
            _ => Err(RecipeError::config_invalid(format!(
                "model identifier must be \"provider/name\" or \"provider/name/deployment\", got \"{identifier}\""
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_and_name() {
        let spec = ModelSpecifier::parse("openai/gpt-4").unwrap();
        assert_eq!(spec.provider, "openai");
        assert_eq!(spec.name, "gpt-4");
        assert_eq!(spec.deployment, None);
    }

    #[test]
    fn parses_azure_deployment_suffix() {
        let spec = ModelSpecifier::parse("azure/gpt-4/my-deployment").unwrap();
        assert_eq!(spec.provider, "azure");
        assert_eq!(spec.name, "gpt-4");
        assert_eq!(spec.deployment, Some("my-deployment".to_string()));
    }

    #[test]
    fn rejects_bare_model_name() {
        assert!(ModelSpecifier::parse("gpt-4").is_err());
    }

    #[test]
    fn rejects_empty_identifier() {
        assert!(ModelSpecifier::parse("").is_err());
        assert!(ModelSpecifier::parse("   ").is_err());
    }

    #[test]
    fn rejects_too_many_segments() {
        assert!(ModelSpecifier::parse("a/b/c/d").is_err());
    }
}
