//! Mutation intents applied to forms

use blockform_editor::{EditorContext, EditorError, FormData, Mutation, SequentialIds};
use serde_json::{json, Value};

fn context() -> EditorContext {
    EditorContext::default().with_id_generator(SequentialIds::new("m"))
}

fn page() -> FormData {
    serde_json::from_value(json!({
        "title": "Page",
        "blocks": {
            "title": { "@type": "title" },
            "intro": { "@type": "slate", "plaintext": "Hello" },
            "hero": { "@type": "image", "url": "/hero.png" }
        },
        "blocks_layout": { "items": ["title", "intro", "hero"] }
    }))
    .unwrap()
}

fn items(form: &FormData) -> Value {
    form["blocks_layout"]["items"].clone()
}

#[test]
fn test_add_mutation() -> anyhow::Result<()> {
    let ctx = context();
    let mutation: Mutation = serde_json::from_value(json!({
        "op": "add",
        "blockType": "video",
        "index": 1
    }))?;

    let result = mutation.apply(&ctx, &page())?;
    assert_eq!(result.block_id.as_deref(), Some("m-0"));
    assert_eq!(items(&result.form), json!(["title", "m-0", "m-1", "intro", "hero"]));
    assert_eq!(result.form["selected"], "m-0");
    Ok(())
}

#[test]
fn test_move_mutation() -> anyhow::Result<()> {
    let ctx = context();
    let mutation = Mutation::Move {
        source: 2,
        destination: 0,
    };

    let result = mutation.apply(&ctx, &page())?;
    assert_eq!(items(&result.form), json!(["hero", "title", "intro"]));
    assert_eq!(result.block_id, None);
    Ok(())
}

#[test]
fn test_delete_mutation() {
    let ctx = context();
    let mutation = Mutation::Delete {
        id: "intro".to_string(),
    };

    let result = mutation.apply(&ctx, &page()).unwrap();
    assert_eq!(items(&result.form), json!(["title", "hero"]));
    assert!(result.form["blocks"].get("intro").is_none());
}

#[test]
fn test_mutate_mutation() {
    let ctx = context();
    let mutation = Mutation::Mutate {
        id: "hero".to_string(),
        value: json!({ "@type": "image", "url": "/other.png" }),
    };

    let result = mutation.apply(&ctx, &page()).unwrap();
    assert_eq!(items(&result.form), json!(["title", "intro", "hero", "m-0"]));
    assert_eq!(result.form["blocks"]["hero"]["url"], "/other.png");
}

#[test]
fn test_insert_mutation_with_patch() {
    let ctx = context();
    let mutation: Mutation = serde_json::from_value(json!({
        "op": "insert",
        "id": "intro",
        "value": { "@type": "slate", "plaintext": "Lead" },
        "current": { "plaintext": "Hello again" }
    }))
    .unwrap();

    let result = mutation.apply(&ctx, &page()).unwrap();
    assert_eq!(result.block_id.as_deref(), Some("m-0"));
    assert_eq!(items(&result.form), json!(["title", "m-0", "intro", "hero"]));
    assert_eq!(result.form["blocks"]["intro"]["plaintext"], "Hello again");
}

#[test]
fn test_change_mutation() {
    let ctx = context();
    let mutation = Mutation::Change {
        id: "title".to_string(),
        value: json!({ "@type": "title", "level": 2 }),
    };

    let result = mutation.apply(&ctx, &page()).unwrap();
    assert_eq!(items(&result.form), items(&page()));
    assert_eq!(result.form["blocks"]["title"]["level"], 2);
}

#[test]
fn test_unknown_id_fails_before_applying() {
    let ctx = context();
    let mutation = Mutation::Mutate {
        id: "ghost".to_string(),
        value: json!({ "@type": "slate" }),
    };

    assert_eq!(
        mutation.apply(&ctx, &page()),
        Err(EditorError::UnknownBlock("ghost".to_string()))
    );
}

#[test]
fn test_invalid_layout_is_malformed() {
    let ctx = context();
    let mut form = page();
    form.insert("blocks_layout".to_string(), json!({ "items": "title" }));

    let err = Mutation::Move {
        source: 0,
        destination: 1,
    }
    .apply(&ctx, &form)
    .unwrap_err();

    assert!(matches!(err, EditorError::Malformed(_)));
}
