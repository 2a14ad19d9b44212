//! ABOUTME: Liquid-like template rendering over a recipe Context
//! ABOUTME: `render` for one-shot substitution, `render_nested` for fixed-point re-rendering

mod filters;
mod raw_block;

use recipe_core::{Context, RecipeError, Result};
use serde_json::Value;
use tera::Tera;

/// Render `text` once against `context`'s artifacts.
///
/// Supports `{{ path.to.value }}` substitution, `if/elsif/else/endif`,
/// `for`, `{% raw %}...{% endraw %}`, and the `snakecase`/`json`/`datetime`
/// filters plus Tera's built-in `default`.
pub fn render(text: &str, context: &Context) -> Result<String> {
    let mut tera = build_tera(text)?;
    let tera_context = build_tera_context(context)?;
    tera.render("__template__", &tera_context)
        .map_err(|e| RecipeError::template_error(text, format_tera_error(&e)))
}

/// Re-render `text` against `context` until the output stops changing,
/// leaving `{% raw %}...{% endraw %}` blocks verbatim across every pass.
pub fn render_nested(text: &str, context: &Context) -> Result<String> {
    let (protected, originals) = raw_block::protect(text);
    let mut current = protected;

    loop {
        let rendered = render(&current, context)?;
        if rendered == current {
            break;
        }
        current = rendered;
    }

    Ok(raw_block::restore(&current, &originals))
}

/// Recursively render every string leaf in `value` (objects, arrays, and
/// bare strings); non-string scalars pass through unchanged. Used for
/// `set_context`'s value and `execute_recipe`'s `context_overrides`.
pub fn render_value(value: &Value, context: &Context) -> Result<Value> {
    render_value_with(value, context, render)
}

/// Same as [`render_value`] but using [`render_nested`] for every string leaf.
pub fn render_value_nested(value: &Value, context: &Context) -> Result<Value> {
    render_value_with(value, context, render_nested)
}

fn render_value_with(
    value: &Value,
    context: &Context,
    render_fn: impl Fn(&str, &Context) -> Result<String> + Copy,
) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(render_fn(s, context)?)),
        Value::Array(items) => items
            .iter()
            .map(|item| render_value_with(item, context, render_fn))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| render_value_with(v, context, render_fn).map(|rendered| (k.clone(), rendered)))
            .collect::<Result<serde_json::Map<_, _>>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

fn build_tera(text: &str) -> Result<Tera> {
    let mut tera = Tera::default();
    tera.register_filter("snakecase", filters::snakecase_filter);
    tera.register_filter("json", filters::json_filter);
    tera.register_filter("datetime", filters::datetime_filter);
    tera.register_function("file_exists", filters::file_exists_function);
    tera.add_raw_template("__template__", text)
        .map_err(|e| RecipeError::template_error(text, format_tera_error(&e)))?;
    Ok(tera)
}

fn build_tera_context(context: &Context) -> Result<tera::Context> {
    let value = serde_json::Value::Object(context.as_dict());
    tera::Context::from_value(value)
        .map_err(|e| RecipeError::template_error("<context>", format_tera_error(&e)))
}

fn format_tera_error(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(s) = source {
        parts.push(s.to_string());
        source = s.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx_with(key: &str, value: serde_json::Value) -> Context {
        let mut ctx = Context::new();
        ctx.set(key, value);
        ctx
    }

    #[test]
    fn substitutes_variable() {
        let ctx = ctx_with("name", json!("world"));
        assert_eq!(render("hello {{ name }}", &ctx).unwrap(), "hello world");
    }

    #[test]
    fn conditionals_work() {
        let ctx = ctx_with("ok", json!(true));
        let out = render("{% if ok %}yes{% else %}no{% endif %}", &ctx).unwrap();
        assert_eq!(out, "yes");
    }

    #[test]
    fn loops_work() {
        let ctx = ctx_with("xs", json!([1, 2, 3]));
        let out = render("{% for x in xs %}{{ x }}{% endfor %}", &ctx).unwrap();
        assert_eq!(out, "123");
    }

    #[test]
    fn raw_block_suppresses_rendering() {
        let ctx = ctx_with("name", json!("world"));
        let out = render("{% raw %}{{ name }}{% endraw %}", &ctx).unwrap();
        assert_eq!(out, "{{ name }}");
    }

    #[test]
    fn snakecase_filter_normalizes() {
        let ctx = ctx_with("title", json!("Hello World!!"));
        let out = render("{{ title | snakecase }}", &ctx).unwrap();
        assert_eq!(out, "hello_world");
    }

    #[test]
    fn json_filter_serializes_compact() {
        let ctx = ctx_with("obj", json!({"a": 1}));
        let out = render("{{ obj | json }}", &ctx).unwrap();
        assert_eq!(out, "{\"a\":1}");
    }

    #[test]
    fn json_filter_honors_indent() {
        let ctx = ctx_with("obj", json!({"a": 1}));
        let out = render("{{ obj | json(indent=2) }}", &ctx).unwrap();
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn default_filter_is_builtin() {
        let ctx = Context::new();
        let out = render("{{ missing | default(value=\"fallback\") }}", &ctx).unwrap();
        assert_eq!(out, "fallback");
    }

    #[test]
    fn template_error_carries_truncated_text() {
        let ctx = Context::new();
        let err = render("{{ unterminated", &ctx).unwrap_err();
        assert!(matches!(err, RecipeError::TemplateError { .. }));
    }

    #[test]
    fn nested_render_reaches_fixed_point() {
        let mut ctx = Context::new();
        ctx.set("a", json!("{{ b }}"));
        ctx.set("b", json!("done"));
        let out = render_nested("{{ a }}", &ctx).unwrap();
        assert_eq!(out, "done");
    }

    #[test]
    fn nested_render_leaves_raw_blocks_verbatim() {
        let mut ctx = Context::new();
        ctx.set("a", json!("{{ b }}"));
        ctx.set("b", json!("done"));
        let out = render_nested("{{ a }} {% raw %}{{ a }}{% endraw %}", &ctx).unwrap();
        assert_eq!(out, "done {{ a }}");
    }

    #[test]
    fn render_value_recurses_into_containers() {
        let ctx = ctx_with("name", json!("world"));
        let value = json!({"greeting": "hi {{ name }}", "n": 1, "tags": ["a{{ name }}"]});
        let out = render_value(&value, &ctx).unwrap();
        assert_eq!(out, json!({"greeting": "hi world", "n": 1, "tags": ["aworld"]}));
    }

    #[test]
    fn render_value_nested_reaches_fixed_point_per_leaf() {
        let mut ctx = Context::new();
        ctx.set("a", json!("{{ b }}"));
        ctx.set("b", json!("done"));
        let value = json!({"x": "{{ a }}"});
        let out = render_value_nested(&value, &ctx).unwrap();
        assert_eq!(out, json!({"x": "done"}));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// `{% raw %}...{% endraw %}` must survive verbatim regardless of
        /// what plain text it wraps.
        #[test]
        fn raw_block_preserves_arbitrary_plain_content(body in "[a-zA-Z0-9 ,.!?_-]{0,40}") {
            let ctx = Context::new();
            let template = format!("{{% raw %}}{body}{{% endraw %}}");
            let out = render(&template, &ctx).unwrap();
            prop_assert_eq!(out, body);
        }

        /// Plain text with no template tags renders to itself, identically
        /// across repeated calls.
        #[test]
        fn render_is_deterministic_for_tagless_text(body in "[a-zA-Z0-9 ,.!?_-]{0,40}") {
            let ctx = Context::new();
            let once = render(&body, &ctx).unwrap();
            let twice = render(&body, &ctx).unwrap();
            prop_assert_eq!(once.clone(), twice);
            prop_assert_eq!(once, body);
        }
    }
}
