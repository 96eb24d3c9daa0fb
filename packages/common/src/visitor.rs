use std::collections::VecDeque;

use serde_json::Value;

use crate::{block_type, get_blocks, BlockFields, FieldConventions, FormData, FormResult};

/// Nesting depth past which nested containers are no longer expanded
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Key under which some blocks keep their nested form
pub const DATA_KEY: &str = "data";

/// Visitor over blocks in breadth-first order
///
/// `depth` is 0 for top-level blocks and grows by one per nested container.
pub trait BlockVisitor {
    fn visit_block(&mut self, id: &str, block: &Value, depth: usize);
}

impl<F> BlockVisitor for F
where
    F: FnMut(&str, &Value),
{
    fn visit_block(&mut self, id: &str, block: &Value, _depth: usize) {
        self(id, block)
    }
}

/// Walk every block of `form`, level by level.
///
/// A block that has its own blocks field (directly, or inside its `data`
/// object) gets its children queued behind everything already waiting, so
/// all blocks of one level are visited before any block of the next.
pub fn visit_blocks<V: BlockVisitor + ?Sized>(
    form: &FormData,
    conventions: &FieldConventions,
    max_depth: usize,
    visitor: &mut V,
) -> FormResult<()> {
    let fields = BlockFields::resolve(form, conventions)?;
    let mut queue: VecDeque<(&str, &Value, usize)> = get_blocks(form, &fields)?
        .into_iter()
        .map(|(id, block)| (id, block, 0))
        .collect();

    while let Some((id, block, depth)) = queue.pop_front() {
        visitor.visit_block(id, block, depth);

        let Some(nested) = nested_form(block, conventions) else {
            continue;
        };

        if depth + 1 > max_depth {
            tracing::warn!("block {} nests deeper than {}, not descending", id, max_depth);
            continue;
        }

        match nested_blocks(nested, conventions) {
            Ok(children) => {
                queue.extend(children.into_iter().map(|(id, block)| (id, block, depth + 1)));
            }
            Err(err) => tracing::warn!("skipping nested blocks of {}: {}", id, err),
        }
    }

    Ok(())
}

/// The nested form embedded in a block, if any
pub fn nested_form<'b>(block: &'b Value, conventions: &FieldConventions) -> Option<&'b FormData> {
    let map = block.as_object()?;
    if has_blocks(map, conventions) {
        return Some(map);
    }

    map.get(DATA_KEY)
        .and_then(Value::as_object)
        .filter(|data| has_blocks(data, conventions))
}

fn has_blocks(form: &FormData, conventions: &FieldConventions) -> bool {
    crate::has_blocks_data(form, conventions)
}

fn nested_blocks<'f>(form: &'f FormData, conventions: &FieldConventions) -> FormResult<Vec<(&'f str, &'f Value)>> {
    let fields = BlockFields::resolve(form, conventions)?;
    get_blocks(form, &fields)
}

/// Ids of all blocks, at any depth, whose type is one of `types`
pub fn find_blocks(
    form: &FormData,
    conventions: &FieldConventions,
    max_depth: usize,
    types: &[&str],
) -> FormResult<Vec<String>> {
    let mut found = Vec::new();
    visit_blocks(form, conventions, max_depth, &mut |id: &str, block: &Value| {
        if block_type(block).is_some_and(|t| types.contains(&t)) {
            found.push(id.to_string());
        }
    })?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> FormData {
        value.as_object().cloned().expect("object")
    }

    struct Recorder(Vec<(String, usize)>);

    impl BlockVisitor for Recorder {
        fn visit_block(&mut self, id: &str, _block: &Value, depth: usize) {
            self.0.push((id.to_string(), depth));
        }
    }

    fn nested_doc() -> FormData {
        form(json!({
            "blocks": {
                "section": {
                    "@type": "section",
                    "blocks": {
                        "inner-1": { "@type": "slate" },
                        "inner-2": {
                            "@type": "columns",
                            "data": {
                                "blocks": { "deep": { "@type": "image" } },
                                "blocks_layout": { "items": ["deep"] }
                            }
                        }
                    },
                    "blocks_layout": { "items": ["inner-1", "inner-2"] }
                },
                "tail": { "@type": "image" }
            },
            "blocks_layout": { "items": ["section", "tail"] }
        }))
    }

    #[test]
    fn test_breadth_first_order() {
        let doc = nested_doc();
        let mut recorder = Recorder(Vec::new());

        visit_blocks(&doc, &FieldConventions::default(), DEFAULT_MAX_DEPTH, &mut recorder).unwrap();

        assert_eq!(
            recorder.0,
            vec![
                ("section".to_string(), 0),
                ("tail".to_string(), 0),
                ("inner-1".to_string(), 1),
                ("inner-2".to_string(), 1),
                ("deep".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_closure_visitor() {
        let doc = nested_doc();
        let mut ids = Vec::new();

        visit_blocks(&doc, &FieldConventions::default(), DEFAULT_MAX_DEPTH, &mut |id: &str, _: &Value| {
            ids.push(id.to_string())
        })
        .unwrap();

        assert_eq!(ids.len(), 5);
        assert_eq!(ids[0], "section");
    }

    #[test]
    fn test_depth_limit_stops_descent() {
        let doc = nested_doc();
        let mut recorder = Recorder(Vec::new());

        visit_blocks(&doc, &FieldConventions::default(), 1, &mut recorder).unwrap();

        let ids: Vec<&str> = recorder.0.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["section", "tail", "inner-1", "inner-2"]);
    }

    #[test]
    fn test_find_blocks_by_type() {
        let doc = nested_doc();

        let images = find_blocks(&doc, &FieldConventions::default(), DEFAULT_MAX_DEPTH, &["image"]).unwrap();
        assert_eq!(images, vec!["tail".to_string(), "deep".to_string()]);
    }

    #[test]
    fn test_document_without_blocks_is_an_error() {
        let doc = form(json!({ "title": "x" }));
        let mut recorder = Recorder(Vec::new());

        assert!(visit_blocks(&doc, &FieldConventions::default(), DEFAULT_MAX_DEPTH, &mut recorder).is_err());
        assert!(recorder.0.is_empty());
    }
}
