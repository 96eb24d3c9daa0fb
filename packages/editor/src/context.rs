//! # Editor Context
//!
//! Everything an operation needs besides the form itself: settings, the
//! block type registry, the id generator and the schema enhancer. Built once
//! by the host and passed by reference into every call; nothing here changes
//! after construction.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use blockform_common::{
    block_type, find_blocks, visit_blocks, BlockFields, BlockVisitor, FieldConventions, FormData,
    DEFAULT_MAX_DEPTH, TYPE_KEY,
};

use crate::blocks::BlockEditor;
use crate::ids::{IdGenerator, UuidIds};
use crate::registry::BlockRegistry;
use crate::schema::SchemaEnhancer;
use crate::EditorResult;

pub const DEFAULT_BLOCK_TYPE: &str = "slate";

const MAX_ID_ATTEMPTS: usize = 1024;

/// Plain, serializable editor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    /// Type of placeholder blocks and of blocks that refill an emptied form
    #[serde(default = "default_block_type")]
    pub default_block_type: String,

    #[serde(default)]
    pub fields: FieldConventions,

    /// Deepest nesting level traversal expands
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_block_type() -> String {
    DEFAULT_BLOCK_TYPE.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_block_type: default_block_type(),
            fields: FieldConventions::default(),
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Clone)]
pub struct EditorContext {
    settings: EditorSettings,
    registry: BlockRegistry,
    ids: Arc<dyn IdGenerator>,
    schema_enhancer: Option<SchemaEnhancer>,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorContext")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("schema_enhancer", &self.schema_enhancer.is_some())
            .finish_non_exhaustive()
    }
}

impl EditorContext {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            settings,
            registry: BlockRegistry::default(),
            ids: Arc::new(UuidIds),
            schema_enhancer: None,
        }
    }

    pub fn with_registry(mut self, registry: BlockRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn with_schema_enhancer<F>(mut self, f: F) -> Self
    where
        F: Fn(crate::BlockSchema, &Value, &crate::Intl) -> crate::BlockSchema + Send + Sync + 'static,
    {
        self.schema_enhancer = Some(Arc::new(f));
        self
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn default_block_type(&self) -> &str {
        &self.settings.default_block_type
    }

    pub fn conventions(&self) -> &FieldConventions {
        &self.settings.fields
    }

    pub(crate) fn schema_enhancer(&self) -> Option<&SchemaEnhancer> {
        self.schema_enhancer.as_ref()
    }

    /// Next id from the generator that `taken` does not reject.
    ///
    /// A generator that keeps repeating taken ids is abandoned after
    /// [`MAX_ID_ATTEMPTS`] draws in favor of a random UUID.
    pub(crate) fn fresh_id(&self, taken: impl Fn(&str) -> bool) -> String {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !taken(&id) {
                return id;
            }
            tracing::debug!("skipping id {} already in use", id);
        }

        tracing::warn!("id generator repeated taken ids {} times, using a UUID", MAX_ID_ATTEMPTS);
        loop {
            let id = UuidIds.next_id();
            if !taken(&id) {
                return id;
            }
        }
    }

    /// Editor bound to the block fields discovered in `form`.
    pub fn editor_for(&self, form: &FormData) -> EditorResult<BlockEditor<'_>> {
        let fields = BlockFields::resolve(form, self.conventions())?;
        Ok(BlockEditor::new(self, fields))
    }

    /// Editor bound to an explicit pair of block fields.
    pub fn editor_with(&self, fields: BlockFields) -> BlockEditor<'_> {
        BlockEditor::new(self, fields)
    }

    // =========================================================================
    // Placeholder policy
    // =========================================================================

    /// Whether `block` has content, per its type's registered predicate.
    ///
    /// Types without a predicate always have a value.
    pub fn block_has_value(&self, block: &Value) -> bool {
        let check = block_type(block)
            .and_then(|t| self.registry.get(t))
            .and_then(|t| t.has_value.as_ref());

        match check {
            Some(check) => check(block),
            None => true,
        }
    }

    /// An empty block of the default type.
    pub fn is_placeholder_block(&self, block: &Value) -> bool {
        block_type(block) == Some(self.default_block_type()) && !self.block_has_value(block)
    }

    /// Payload of a new, empty block of `block_type`.
    pub fn new_block(&self, block_type: &str) -> Value {
        let mut block = Map::new();
        block.insert(TYPE_KEY.to_string(), Value::String(block_type.to_string()));
        Value::Object(block)
    }

    /// Drop the run of placeholder blocks at the end of the layout.
    ///
    /// Forms whose block fields cannot be read come back unchanged.
    pub fn cleanup_last_placeholders(&self, form: &FormData) -> FormData {
        match BlockFields::resolve(form, self.conventions()) {
            Ok(fields) => self.editor_with(fields).cleanup_last_placeholders(form),
            Err(_) => form.clone(),
        }
    }

    // =========================================================================
    // Form construction
    // =========================================================================

    /// A form holding a single default-type block.
    pub fn empty_blocks_form(&self) -> FormData {
        let default_type = self.default_block_type().to_string();
        self.blocks_form_generator(1, &default_type)
    }

    /// A form holding `count` fresh blocks of `block_type`.
    pub fn blocks_form_generator(&self, count: usize, block_type: &str) -> FormData {
        let fields = BlockFields::conventional(self.conventions());
        let mut blocks = Map::new();
        let mut items = Vec::with_capacity(count);

        for _ in 0..count {
            let id = self.fresh_id(|id| blocks.contains_key(id));
            blocks.insert(id.clone(), self.new_block(block_type));
            items.push(id);
        }

        fields.rebuild(&FormData::new(), items, blocks)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Breadth-first walk over every block of `form`, nested ones included.
    pub fn visit_blocks<V: BlockVisitor + ?Sized>(&self, form: &FormData, visitor: &mut V) -> EditorResult<()> {
        visit_blocks(form, self.conventions(), self.settings.max_depth, visitor)?;
        Ok(())
    }

    /// Ids of every block of one of `types`, at any depth.
    pub fn find_blocks(&self, form: &FormData, types: &[&str]) -> EditorResult<Vec<String>> {
        Ok(find_blocks(form, self.conventions(), self.settings.max_depth, types)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::registry::BlockType;
    use serde_json::json;

    fn context() -> EditorContext {
        let registry = BlockRegistry::new().with(
            "slate",
            BlockType::new().with_has_value(|b| {
                b.get("plaintext")
                    .and_then(Value::as_str)
                    .is_some_and(|t| !t.trim().is_empty())
            }),
        );

        EditorContext::default()
            .with_registry(registry)
            .with_id_generator(SequentialIds::new("b"))
    }

    #[test]
    fn test_parse_settings() {
        let json = r#"{
            "defaultBlockType": "text",
            "fields": { "blocksSuffix": "blocks" },
            "maxDepth": 8
        }"#;

        let settings: EditorSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.default_block_type, "text");
        assert_eq!(settings.fields.layout_suffix, "blocks_layout");
        assert_eq!(settings.max_depth, 8);

        let settings: EditorSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, EditorSettings::default());
    }

    #[test]
    fn test_block_has_value() {
        let ctx = context();

        assert!(ctx.block_has_value(&json!({ "@type": "image" })));
        assert!(ctx.block_has_value(&json!({ "@type": "slate", "plaintext": "hi" })));
        assert!(!ctx.block_has_value(&json!({ "@type": "slate", "plaintext": "  " })));
    }

    #[test]
    fn test_is_placeholder_block() {
        let ctx = context();

        assert!(ctx.is_placeholder_block(&json!({ "@type": "slate" })));
        assert!(!ctx.is_placeholder_block(&json!({ "@type": "slate", "plaintext": "x" })));
        assert!(!ctx.is_placeholder_block(&json!({ "@type": "image" })));
        assert!(!ctx.is_placeholder_block(&json!({})));
    }

    #[test]
    fn test_empty_blocks_form() {
        let ctx = context();
        let form = ctx.empty_blocks_form();

        assert_eq!(
            Value::Object(form),
            json!({
                "blocks": { "b-0": { "@type": "slate" } },
                "blocks_layout": { "items": ["b-0"] }
            })
        );
    }

    #[test]
    fn test_blocks_form_generator() {
        let ctx = context();
        let form = ctx.blocks_form_generator(3, "image");

        assert_eq!(form["blocks_layout"]["items"], json!(["b-0", "b-1", "b-2"]));
        assert_eq!(form["blocks"]["b-2"], json!({ "@type": "image" }));

        let form = ctx.blocks_form_generator(0, "image");
        assert_eq!(form["blocks_layout"]["items"], json!([]));
    }

    #[test]
    fn test_cleanup_on_form_without_blocks() {
        let ctx = context();
        let form = json!({ "title": "no blocks" }).as_object().cloned().unwrap();

        assert_eq!(ctx.cleanup_last_placeholders(&form), form);
    }
}
