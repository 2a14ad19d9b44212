//! ABOUTME: Shared mutable execution state threaded through a recipe's steps
//! ABOUTME: Two namespaces (artifacts, config), clone/merge semantics, no shared mutability

use crate::error::{RecipeError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::trace;

/// How a `set_context` write should combine with an existing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfExists {
    Overwrite,
    Merge,
}

/// The process-local state container threaded through a recipe's steps.
///
/// Holds two namespaces: `artifacts` (the mutable working set every step
/// reads and writes) and `config` (read-mostly process parameters). Keys
/// are strings; values are JSON-compatible. `Context` is never shared
/// mutably across concurrent tasks — `parallel` and concurrent `loop`
/// iterations each work on their own `clone()`.
#[derive(Debug, Clone, Default)]
pub struct Context {
    artifacts: HashMap<String, Value>,
    config: HashMap<String, Value>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value from `artifacts`, or `None` if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.artifacts.get(key)
    }

    /// Get a value from `artifacts`, failing with `KeyMissing` if absent.
    pub fn get_required(&self, key: &str) -> Result<&Value> {
        self.artifacts
            .get(key)
            .ok_or_else(|| RecipeError::key_missing(key))
    }

    /// Get a value from `artifacts` or return `default` if absent.
    #[must_use]
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.artifacts.get(key).cloned().unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.artifacts.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.artifacts.keys()
    }

    /// Set a value in `artifacts`, overwriting any existing value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        trace!(key = %key, "context: set artifact");
        self.artifacts.insert(key, value);
    }

    /// Set a value in `artifacts`, applying the merge rules in
    /// [`merge_values`] when `if_exists == Merge` and a value already exists.
    pub fn set_with(
        &mut self,
        key: impl Into<String>,
        value: Value,
        if_exists: IfExists,
    ) -> Result<()> {
        let key = key.into();
        match (if_exists, self.artifacts.get(&key).cloned()) {
            (IfExists::Overwrite, _) | (IfExists::Merge, None) => {
                self.artifacts.insert(key, value);
            }
            (IfExists::Merge, Some(existing)) => {
                self.artifacts.insert(key, merge_values(existing, value));
            }
        }
        Ok(())
    }

    /// Shallow copy of `artifacts`, suitable for template evaluation.
    #[must_use]
    pub fn as_dict(&self) -> Map<String, Value> {
        self.artifacts
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// The `config` namespace accessor — distinct from `artifacts`, never
    /// merged into `as_dict()` unless a step explicitly chooses to.
    #[must_use]
    pub fn config(&self) -> &HashMap<String, Value> {
        &self.config
    }

    pub fn get_config(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    pub fn set_config(&mut self, key: impl Into<String>, value: Value) {
        self.config.insert(key.into(), value);
    }

    /// Deep-copy both namespaces. Writes to the clone never affect the
    /// parent, and vice versa.
    #[must_use]
    pub fn clone_deep(&self) -> Self {
        self.clone()
    }
}

/// Combine an existing artifact value with a new one, per the `set_context`
/// `if_exists: "merge"` rules:
///
/// | existing | new | result |
/// |---|---|---|
/// | string | string | concatenation |
/// | list | list | element-wise append |
/// | list | scalar | append scalar |
/// | mapping | mapping | shallow union; new overrides |
/// | other | any | `[existing, new]` |
#[must_use]
pub fn merge_values(existing: Value, new: Value) -> Value {
    match (existing, new) {
        (Value::String(mut a), Value::String(b)) => {
            a.push_str(&b);
            Value::String(a)
        }
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Value::Array(a)
        }
        (Value::Array(mut a), scalar) => {
            a.push(scalar);
            Value::Array(a)
        }
        (Value::Object(mut a), Value::Object(b)) => {
            for (k, v) in b {
                a.insert(k, v);
            }
            Value::Object(a)
        }
        (other, new) => Value::Array(vec![other, new]),
    }
}
