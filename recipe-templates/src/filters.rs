//! ABOUTME: Custom Tera filters and functions required by the template contract

use serde_json::Value;
use std::collections::HashMap;
use tera::{try_get_value, Result as TeraResult};

pub fn snakecase_filter(value: &Value, _args: &HashMap<String, Value>) -> TeraResult<Value> {
    let s = try_get_value!("snakecase", "value", String, value);
    let mut out = String::with_capacity(s.len());
    let mut last_was_sep = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = out.trim_matches('_').to_string();
    Ok(Value::String(trimmed))
}

pub fn json_filter(value: &Value, args: &HashMap<String, Value>) -> TeraResult<Value> {
    let rendered = match args.get("indent").and_then(Value::as_u64) {
        Some(indent) => {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(
                " ".repeat(indent as usize).as_bytes(),
            );
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            serde::Serialize::serialize(value, &mut ser)
                .map_err(|e| tera::Error::msg(format!("json filter: {e}")))?;
            String::from_utf8(buf).map_err(|e| tera::Error::msg(format!("json filter: {e}")))?
        }
        None => serde_json::to_string(value)
            .map_err(|e| tera::Error::msg(format!("json filter: {e}")))?,
    };
    Ok(Value::String(rendered))
}

pub fn datetime_filter(value: &Value, args: &HashMap<String, Value>) -> TeraResult<Value> {
    let s = try_get_value!("datetime", "value", String, value);
    let parsed = chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
                .map(|naive| chrono::DateTime::from_naive_utc_and_offset(naive, chrono::Utc))
        })
        .map_err(|e| tera::Error::msg(format!("datetime filter: unparseable value \"{s}\": {e}")))?;

    let format = args.get("format").and_then(Value::as_str).unwrap_or("medium");
    let pattern = match format {
        "short" => "%m/%d/%y %H:%M",
        "medium" => "%b %d, %Y %H:%M:%S",
        "long" => "%B %d, %Y %H:%M:%S %Z",
        "full" => "%A, %B %d, %Y %H:%M:%S %Z",
        cldr_like => cldr_like,
    };
    Ok(Value::String(parsed.format(pattern).to_string()))
}

pub fn file_exists_function(args: &HashMap<String, Value>) -> TeraResult<Value> {
    let path = args
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("file_exists: missing \"path\" argument"))?;
    Ok(Value::Bool(std::path::Path::new(path).exists()))
}
