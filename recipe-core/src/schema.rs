//! ABOUTME: JSON-Schema fragment to typed record conversion (model utilities)
//! ABOUTME: Used by llm_generate to coerce/validate structured LLM output

use crate::error::{RecipeError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single field's type within a [`RecordSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Bool,
    Array(Box<FieldType>),
    Object(RecordSchema),
    /// Any type the converter doesn't recognize; accepted without validation.
    Opaque,
}

/// A typed record class mirroring one JSON-Schema `object` fragment's
/// `properties`, with its own deterministically generated name for nested
/// object fields. `raw` keeps the original fragment around so validation can
/// defer to a real JSON-Schema validator instead of re-deriving one from
/// `fields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    pub name: String,
    pub fields: BTreeMap<String, FieldType>,
    pub required: Vec<String>,
    pub raw: Value,
}

/// Convert a JSON-Schema object fragment into a typed record class.
///
/// The root schema MUST be an object (`"type": "object"` with
/// `"properties"`); anything else fails with `SchemaInvalid`.
pub fn json_object_to_record(schema: &Value, name: &str) -> Result<RecordSchema> {
    let obj = schema.as_object().ok_or_else(|| {
        RecipeError::schema_invalid("root schema must be a JSON object fragment")
    })?;

    let declared_type = obj.get("type").and_then(Value::as_str);
    if let Some(t) = declared_type {
        if t != "object" {
            return Err(RecipeError::schema_invalid(format!(
                "root schema type must be \"object\", got \"{t}\""
            )));
        }
    }

    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| RecipeError::schema_invalid("object schema missing \"properties\""))?;

    let required: Vec<String> = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let mut fields = BTreeMap::new();
    for (field_name, field_schema) in properties {
        let nested_name = format!("{name}_{field_name}");
        fields.insert(field_name.clone(), field_type_from_schema(field_schema, &nested_name)?);
    }

    Ok(RecordSchema {
        name: name.to_string(),
        fields,
        required,
        raw: Value::Object(obj.clone()),
    })
}

fn field_type_from_schema(schema: &Value, nested_name: &str) -> Result<FieldType> {
    let Some(obj) = schema.as_object() else {
        return Ok(FieldType::Opaque);
    };
    let Some(t) = obj.get("type").and_then(Value::as_str) else {
        return Ok(FieldType::Opaque);
    };
    Ok(match t {
        "string" => FieldType::String,
        "integer" => FieldType::Integer,
        "number" => FieldType::Float,
        "boolean" => FieldType::Bool,
        "array" | "list" => {
            let item_type = obj
                .get("items")
                .map(|items| field_type_from_schema(items, nested_name))
                .transpose()?
                .unwrap_or(FieldType::Opaque);
            FieldType::Array(Box::new(item_type))
        }
        "object" => FieldType::Object(json_object_to_record(schema, nested_name)?),
        _ => FieldType::Opaque,
    })
}

/// A JSON value that has been validated against a [`RecordSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRecord {
    pub schema: RecordSchema,
    pub value: Value,
}

impl TypedRecord {
    /// Validate `value` against `schema.raw` with a real JSON-Schema
    /// validator, coercing nothing: a `string` field holding a JSON string
    /// that merely looks numeric (e.g. `"7"`) still fails — structured
    /// output must match the schema's declared types exactly.
    pub fn validate(schema: RecordSchema, value: Value) -> Result<Self> {
        let validator = jsonschema::validator_for(&schema.raw)
            .map_err(|e| RecipeError::schema_invalid(format!("{}: invalid schema: {e}", schema.name)))?;
        if let Err(e) = validator.validate(&value) {
            return Err(RecipeError::schema_invalid(format!("{}: {e}", schema.name)));
        }
        Ok(Self { schema, value })
    }
}
