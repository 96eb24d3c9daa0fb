//! Long mutation sequences
//!
//! This tests:
//! - Layout / block map consistency after every step
//! - The layout never ends up empty
//! - Placeholder count stays bounded

use std::collections::HashSet;

use blockform_editor::{
    BlockRegistry, BlockType, EditorContext, FormData, Mutation, SequentialIds,
};
use serde_json::{json, Value};

fn context() -> EditorContext {
    let registry = BlockRegistry::new().with(
        "slate",
        BlockType::new().with_has_value(|b| b.get("plaintext").is_some()),
    );
    EditorContext::default()
        .with_registry(registry)
        .with_id_generator(SequentialIds::new("s"))
}

fn items(form: &FormData) -> Vec<String> {
    form["blocks_layout"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

fn check_invariants(form: &FormData) {
    let layout = items(form);
    let unique: HashSet<&String> = layout.iter().collect();
    assert_eq!(unique.len(), layout.len(), "duplicate ids in layout");

    let keys: HashSet<&String> = form["blocks"].as_object().unwrap().keys().collect();
    assert_eq!(unique, keys, "layout and block map out of sync");
    assert!(!layout.is_empty(), "layout is empty");
}

/// Deterministic pick of an existing block id
fn pick(form: &FormData, step: usize) -> String {
    let layout = items(form);
    layout[(step * 7 + 3) % layout.len()].clone()
}

fn step_mutation(form: &FormData, step: usize) -> Mutation {
    match step % 6 {
        0 => Mutation::Add {
            block_type: ["image", "slate", "video"][step % 3].to_string(),
            index: if step % 4 == 0 { None } else { Some(step % 5) },
        },
        1 => Mutation::Move {
            source: step % 4,
            destination: step % 3,
        },
        2 => Mutation::Delete { id: pick(form, step) },
        3 => Mutation::Mutate {
            id: pick(form, step),
            value: json!({ "@type": "slate", "plaintext": format!("step {}", step) }),
        },
        4 => Mutation::Insert {
            id: pick(form, step),
            value: json!({ "@type": "image" }),
            current: None,
            offset: step % 2,
        },
        _ => Mutation::Change {
            id: pick(form, step),
            value: json!({ "@type": "image", "step": step }),
        },
    }
}

#[test]
fn test_invariants_hold_over_long_sequence() {
    let ctx = context();
    let mut form = ctx.empty_blocks_form();

    for step in 0..200 {
        let mutation = step_mutation(&form, step);
        let result = mutation
            .apply(&ctx, &form)
            .unwrap_or_else(|e| panic!("step {} ({}) failed: {}", step, mutation.name(), e));
        check_invariants(&result.form);
        form = result.form;
    }
}

#[test]
fn test_delete_everything_one_by_one() {
    let ctx = context();
    let mut form = ctx.blocks_form_generator(5, "image");
    let original: Vec<String> = items(&form);

    for id in &original {
        form = Mutation::Delete { id: id.clone() }.apply(&ctx, &form).unwrap().form;
        check_invariants(&form);
    }

    let remaining = items(&form);
    assert_eq!(remaining.len(), 1);
    assert!(!original.contains(&remaining[0]));
    assert_eq!(form["blocks"][&remaining[0]], json!({ "@type": "slate" }));
}

#[test]
fn test_repeated_mutate_does_not_pile_up_placeholders() {
    let ctx = context();
    let form = ctx.empty_blocks_form();
    let id = items(&form)[0].clone();

    let mut form = form;
    for n in 0..10 {
        form = Mutation::Mutate {
            id: id.clone(),
            value: json!({ "@type": "slate", "plaintext": format!("v{}", n) }),
        }
        .apply(&ctx, &form)
        .unwrap()
        .form;
    }

    assert_eq!(items(&form).len(), 2);
    let trailing = &items(&form)[1];
    assert_eq!(form["blocks"][trailing], json!({ "@type": "slate" }));
}

#[test]
fn test_cleanup_after_editing_session() {
    let ctx = context();
    let mut form = ctx.empty_blocks_form();

    for block_type in ["image", "video", "image"] {
        form = Mutation::Add {
            block_type: block_type.to_string(),
            index: None,
        }
        .apply(&ctx, &form)
        .unwrap()
        .form;
    }

    let cleaned = Mutation::Cleanup.apply(&ctx, &form).unwrap().form;
    check_invariants(&cleaned);

    let last = items(&cleaned).last().cloned().unwrap();
    assert_eq!(cleaned["blocks"][&last]["@type"], Value::from("image"));
    assert_eq!(Mutation::Cleanup.apply(&ctx, &cleaned).unwrap().form, cleaned);
}
