// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn bucket() -> serde_json::Value {
    json!({
        "rule": { "id": "r1" },
        "events": [
            { "event_type": "acme.prod.check_disk", "data": { "name": "disk" } },
            { "event_type": "acme.prod.check_disk", "data": { "name": "root" } }
        ]
    })
}

async fn run(source: &str) -> ScriptOutcome {
    TemplateScriptEngine::new()
        .execute(&Script::new("s1", source), &bucket())
        .await
}

#[tokio::test]
async fn json_output_becomes_value() {
    let outcome = run(r#"{"name": {{ (bucket.events[0].data.name ~ "test") | tojson }} }"#).await;

    assert_eq!(outcome, ScriptOutcome::Value(json!({ "name": "disktest" })));
}

#[tokio::test]
async fn loops_over_events() {
    let outcome = run(
        r#"[{% for e in bucket.events %}{{ e.data.name | tojson }}{% if not loop.last %},{% endif %}{% endfor %}]"#,
    )
    .await;

    assert_eq!(outcome, ScriptOutcome::Value(json!(["disk", "root"])));
}

#[tokio::test]
async fn plain_text_becomes_string() {
    let outcome = run("rule {{ bucket.rule.id }} fired").await;

    assert_eq!(outcome, ScriptOutcome::Value(json!("rule r1 fired")));
}

#[yare::parameterized(
    empty = { "" },
    whitespace = { "  \n" },
    null = { "null" },
    conditional = { "{% if bucket.events | length > 5 %}big{% endif %}" },
)]
fn nothing_rendered_is_nil(source: &str) {
    let outcome = TemplateScriptEngine::new().render(&Script::new("s1", source), &bucket());
    assert_eq!(outcome, ScriptOutcome::Nil);
}

#[yare::parameterized(
    syntax = { "{{ bucket.events[0" },
    undefined = { "{{ bucket.missing.field }}" },
)]
fn errors_are_exceptions(source: &str) {
    let outcome = TemplateScriptEngine::new().render(&Script::new("s1", source), &bucket());
    assert!(
        matches!(outcome, ScriptOutcome::Exception(_)),
        "got {:?}",
        outcome
    );
    assert_eq!(outcome.into_value(), None);
}
