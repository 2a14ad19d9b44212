//! ABOUTME: End-to-end recipe scenarios run through the Executor, no stubbed network calls
//! ABOUTME: Mirrors the deterministic scenarios a recipe author would actually write

use recipe_core::{Context, Recipe};
use recipe_steps::{default_registry, Executor};
use serde_json::json;
use tempfile::tempdir;

fn executor() -> Executor {
    Executor::new(default_registry())
}

#[tokio::test]
async fn merge_semantics_concatenate_strings() {
    let recipe = Recipe::parse(
        r#"{"steps": [
            {"type": "set_context", "config": {"key": "doc", "value": "B", "if_exists": "merge"}}
        ]}"#,
    )
    .unwrap();
    let mut ctx = Context::new();
    ctx.set("doc", json!("A"));

    executor().run(&recipe, &mut ctx).await.unwrap();
    assert_eq!(ctx.get("doc"), Some(&json!("AB")));
}

#[tokio::test]
async fn conditional_runs_only_the_true_branch() {
    let recipe = Recipe::parse(
        r#"{"steps": [
            {"type": "conditional", "config": {
                "condition": "{% if ready %}true{% else %}false{% endif %}",
                "if_true": {"steps": [{"type": "set_context", "config": {"key": "taken", "value": "yes"}}]},
                "if_false": {"steps": [{"type": "set_context", "config": {"key": "taken", "value": "no"}}]}
            }}
        ]}"#,
    )
    .unwrap();
    let mut ctx = Context::new();
    ctx.set("ready", json!(true));

    executor().run(&recipe, &mut ctx).await.unwrap();
    assert_eq!(ctx.get("taken"), Some(&json!("yes")));
}

#[tokio::test]
async fn conditional_runs_only_the_false_branch() {
    let recipe = Recipe::parse(
        r#"{"steps": [
            {"type": "conditional", "config": {
                "condition": "{% if ready %}true{% else %}false{% endif %}",
                "if_true": {"steps": [{"type": "set_context", "config": {"key": "taken", "value": "yes"}}]},
                "if_false": {"steps": [{"type": "set_context", "config": {"key": "taken", "value": "no"}}]}
            }}
        ]}"#,
    )
    .unwrap();
    let mut ctx = Context::new();
    ctx.set("ready", json!(false));

    executor().run(&recipe, &mut ctx).await.unwrap();
    assert_eq!(ctx.get("taken"), Some(&json!("no")));
}

#[tokio::test]
async fn parallel_substeps_do_not_leak_writes_into_the_parent() {
    let recipe = Recipe::parse(
        r#"{"steps": [
            {"type": "parallel", "config": {"substeps": [
                {"type": "set_context", "config": {"key": "x", "value": "from_a"}},
                {"type": "set_context", "config": {"key": "x", "value": "from_b"}}
            ]}}
        ]}"#,
    )
    .unwrap();
    let mut ctx = Context::new();
    ctx.set("x", json!("original"));

    executor().run(&recipe, &mut ctx).await.unwrap();
    assert_eq!(ctx.get("x"), Some(&json!("original")));
}

#[tokio::test]
async fn loop_aggregates_squares_in_order_under_concurrency() {
    let recipe = Recipe::parse(
        r#"{"steps": [
            {"type": "loop", "config": {
                "items": [1, 2, 3],
                "item_key": "item",
                "result_key": "squares",
                "max_concurrency": 3,
                "substeps": [
                    {"type": "set_context", "config": {"key": "item", "value": {"sq": "{{ item | json }}"}, "if_exists": "overwrite"}}
                ]
            }}
        ]}"#,
    )
    .unwrap();
    let mut ctx = Context::new();

    executor().run(&recipe, &mut ctx).await.unwrap();
    let squares = ctx.get("squares").unwrap().as_array().unwrap();
    assert_eq!(squares.len(), 3);
    assert_eq!(squares[0]["item"]["sq"], json!("1"));
    assert_eq!(squares[1]["item"]["sq"], json!("2"));
    assert_eq!(squares[2]["item"]["sq"], json!("3"));
}

#[tokio::test]
async fn execute_recipe_shares_context_with_the_parent() {
    let dir = tempdir().unwrap();
    let sub_path = dir.path().join("sub.json");
    std::fs::write(
        &sub_path,
        r#"{"steps": [{"type": "set_context", "config": {"key": "from_sub", "value": "hi"}}]}"#,
    )
    .unwrap();

    let recipe_json = json!({
        "steps": [
            {"type": "execute_recipe", "config": {"recipe_path": sub_path.to_str().unwrap()}}
        ]
    });
    let recipe = Recipe::parse(&recipe_json.to_string()).unwrap();
    let mut ctx = Context::new();

    executor().run(&recipe, &mut ctx).await.unwrap();
    assert_eq!(ctx.get("from_sub"), Some(&json!("hi")));
}

#[tokio::test]
async fn read_files_then_write_files_round_trips_text_content() {
    let dir = tempdir().unwrap();
    let spec_path = dir.path().join("spec.txt");
    std::fs::write(&spec_path, "print hello").unwrap();
    let out_dir = dir.path().join("out");

    let recipe_json = json!({
        "steps": [
            {"type": "read_files", "config": {"path": spec_path.to_str().unwrap(), "content_key": "spec"}},
            {"type": "write_files", "config": {
                "files": [{"path": "echoed.txt", "content_key": "spec"}],
                "root": out_dir.to_str().unwrap()
            }}
        ]
    });
    let recipe = Recipe::parse(&recipe_json.to_string()).unwrap();
    let mut ctx = Context::new();

    executor().run(&recipe, &mut ctx).await.unwrap();
    let written = std::fs::read_to_string(out_dir.join("echoed.txt")).unwrap();
    assert_eq!(written, "print hello");
}

#[tokio::test]
async fn unknown_step_type_aborts_the_whole_recipe() {
    let recipe = Recipe::parse(
        r#"{"steps": [
            {"type": "set_context", "config": {"key": "a", "value": 1}},
            {"type": "not_a_real_step", "config": {}}
        ]}"#,
    )
    .unwrap();
    let mut ctx = Context::new();

    let err = executor().run(&recipe, &mut ctx).await.unwrap_err();
    assert!(err.to_string().contains("/steps/1"));
    assert_eq!(ctx.get("a"), Some(&json!(1)));
}
