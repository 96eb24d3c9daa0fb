//! # Block Operations
//!
//! Structural edits of one block container.
//!
//! Every operation borrows the current form and returns a new one; the input
//! is never touched, so older snapshots stay valid for whoever still holds
//! them. The block map and the layout are always rewritten together.
//!
//! ## Placeholders
//!
//! A placeholder is an empty block of the default type. Adding a block of
//! any other type, or giving a block content through [`BlockEditor::mutate_block`],
//! leaves exactly one placeholder right after it so there is always an empty
//! block to type into. [`BlockEditor::cleanup_last_placeholders`] strips the
//! trailing ones again before a form is stored.
//!
//! ## Unknown ids
//!
//! Operations addressing a block that is not part of the form fail with
//! [`EditorError::UnknownBlock`] instead of producing a form whose layout
//! and block map disagree.

use serde_json::{Map, Value};

use blockform_common::{get_blocks, BlockFields, FormData};

use crate::context::EditorContext;
use crate::{EditorError, EditorResult};

/// Key set on the form to the id of the block the user just added
pub const SELECTED_KEY: &str = "selected";

/// Block operations on forms whose block fields are already resolved
#[derive(Debug, Clone)]
pub struct BlockEditor<'ctx> {
    ctx: &'ctx EditorContext,
    fields: BlockFields,
}

impl<'ctx> BlockEditor<'ctx> {
    pub fn new(ctx: &'ctx EditorContext, fields: BlockFields) -> Self {
        Self { ctx, fields }
    }

    pub fn fields(&self) -> &BlockFields {
        &self.fields
    }

    pub fn context(&self) -> &'ctx EditorContext {
        self.ctx
    }

    /// `(id, payload)` pairs in layout order.
    pub fn get_blocks<'f>(&self, form: &'f FormData) -> EditorResult<Vec<(&'f str, &'f Value)>> {
        Ok(get_blocks(form, &self.fields)?)
    }

    /// Move the block at `source` to `destination`.
    ///
    /// A `source` past the end leaves the form as it is; `destination` is
    /// clamped to the last position.
    pub fn move_block(&self, form: &FormData, source: usize, destination: usize) -> EditorResult<FormData> {
        let mut items = self.fields.layout_items(form)?;
        let blocks = self.fields.block_map_owned(form)?;

        if source >= items.len() {
            tracing::debug!("move_block: source {} out of range ({} blocks)", source, items.len());
            return Ok(form.clone());
        }

        let id = items.remove(source);
        let destination = destination.min(items.len());
        tracing::debug!("move_block: {} from {} to {}", id, source, destination);
        items.insert(destination, id);

        Ok(self.fields.rebuild(form, items, blocks))
    }

    /// Remove a block. A form left without blocks gets one fresh
    /// default-type block.
    pub fn delete_block(&self, form: &FormData, id: &str) -> EditorResult<FormData> {
        let mut items = self.fields.layout_items(form)?;
        let mut blocks = self.fields.block_map_owned(form)?;

        let in_layout = items.iter().any(|item| item == id);
        if !in_layout && !blocks.contains_key(id) {
            return Err(EditorError::UnknownBlock(id.to_string()));
        }

        items.retain(|item| item != id);
        blocks.remove(id);
        tracing::debug!("delete_block: {} ({} left)", id, items.len());

        let emptied = items.is_empty();
        let next = self.fields.rebuild(form, items, blocks);
        if emptied {
            let (_, next) = self.add_block(&next, self.ctx.default_block_type(), Some(0))?;
            return Ok(next);
        }

        Ok(next)
    }

    /// Add a new block of `block_type` at `index` (`None` appends).
    ///
    /// Blocks of any type but the default one are followed by a fresh
    /// placeholder. The new block becomes the form's `selected` block.
    pub fn add_block(
        &self,
        form: &FormData,
        block_type: &str,
        index: Option<usize>,
    ) -> EditorResult<(String, FormData)> {
        let mut items = self.fields.layout_items(form)?;
        let mut blocks = self.fields.block_map_owned(form)?;

        let insert = index.unwrap_or(items.len()).min(items.len());
        let id = self.fresh_id(&items, &blocks);
        blocks.insert(id.clone(), self.ctx.new_block(block_type));
        items.insert(insert, id.clone());

        if block_type != self.ctx.default_block_type() {
            let trailing = self.fresh_id(&items, &blocks);
            blocks.insert(trailing.clone(), self.ctx.new_block(self.ctx.default_block_type()));
            items.insert(insert + 1, trailing);
        }

        tracing::debug!("add_block: {} ({}) at {}", id, block_type, insert);

        let mut next = self.fields.rebuild(form, items, blocks);
        next.insert(SELECTED_KEY.to_string(), Value::String(id.clone()));

        let next = self.apply_initial_value(next, &id, block_type);
        Ok((id, next))
    }

    /// An id used neither in the layout nor in the block map.
    fn fresh_id(&self, items: &[String], blocks: &Map<String, Value>) -> String {
        self.ctx
            .fresh_id(|id| blocks.contains_key(id) || items.iter().any(|item| item == id))
    }

    fn apply_initial_value(&self, mut form: FormData, id: &str, block_type: &str) -> FormData {
        let Some(initial_value) = self
            .ctx
            .registry()
            .get(block_type)
            .and_then(|t| t.initial_value.as_ref())
        else {
            return form;
        };

        let Some(current) = self.fields.block(&form, id) else {
            return form;
        };

        let value = initial_value(id, current, &form);
        if let Some(Value::Object(blocks)) = form.get_mut(&self.fields.blocks) {
            blocks.insert(id.to_string(), value);
        }
        form
    }

    /// Set a block's payload and make sure a placeholder follows it.
    ///
    /// If the next block already is a placeholder it is kept as it is;
    /// otherwise a new one is inserted right after `id`.
    pub fn mutate_block(&self, form: &FormData, id: &str, value: Value) -> EditorResult<FormData> {
        let mut items = self.fields.layout_items(form)?;
        let mut blocks = self.fields.block_map_owned(form)?;

        let index = items
            .iter()
            .position(|item| item == id)
            .ok_or_else(|| EditorError::UnknownBlock(id.to_string()))?
            + 1;

        let followed_by_placeholder = items
            .get(index)
            .and_then(|next| blocks.get(next))
            .is_some_and(|next| self.ctx.is_placeholder_block(next));

        blocks.insert(id.to_string(), value);

        if followed_by_placeholder {
            tracing::debug!("mutate_block: {} (placeholder kept)", id);
        } else {
            let trailing = self.fresh_id(&items, &blocks);
            blocks.insert(trailing.clone(), self.ctx.new_block(self.ctx.default_block_type()));
            tracing::debug!("mutate_block: {} (new placeholder {})", id, trailing);
            items.insert(index, trailing);
        }

        Ok(self.fields.rebuild(form, items, blocks))
    }

    /// Insert a new block right before `id`.
    ///
    /// `current` is merged into the payload of `id` in the same step.
    pub fn insert_block(
        &self,
        form: &FormData,
        id: &str,
        value: Value,
        current: Option<&Map<String, Value>>,
    ) -> EditorResult<(String, FormData)> {
        self.insert_block_at(form, id, value, current, 0)
    }

    /// Insert a new block `offset` positions after the slot of `id`
    /// (`0` = before `id`, `1` = right after it).
    pub fn insert_block_at(
        &self,
        form: &FormData,
        id: &str,
        value: Value,
        current: Option<&Map<String, Value>>,
        offset: usize,
    ) -> EditorResult<(String, FormData)> {
        let mut items = self.fields.layout_items(form)?;
        let mut blocks = self.fields.block_map_owned(form)?;

        let index = items
            .iter()
            .position(|item| item == id)
            .ok_or_else(|| EditorError::UnknownBlock(id.to_string()))?;

        if let Some(current) = current {
            let anchor = blocks.entry(id.to_string()).or_insert_with(|| Value::Object(Map::new()));
            merge_into(anchor, current);
        }

        let new_id = self.fresh_id(&items, &blocks);
        let insert = (index + offset).min(items.len());
        blocks.insert(new_id.clone(), value);
        items.insert(insert, new_id.clone());
        tracing::debug!("insert_block: {} at {} (anchor {})", new_id, insert, id);

        Ok((new_id, self.fields.rebuild(form, items, blocks)))
    }

    /// Replace a block's payload. No placeholder handling.
    pub fn change_block(&self, form: &FormData, id: &str, value: Value) -> EditorResult<FormData> {
        let items = self.fields.layout_items(form)?;
        let mut blocks = self.fields.block_map_owned(form)?;

        if !blocks.contains_key(id) && !items.iter().any(|item| item == id) {
            return Err(EditorError::UnknownBlock(id.to_string()));
        }

        blocks.insert(id.to_string(), value);
        tracing::debug!("change_block: {}", id);

        Ok(self.fields.rebuild(form, items, blocks))
    }

    /// Id of the block after `id`, `None` for the last one.
    pub fn next_block_id(&self, form: &FormData, id: &str) -> EditorResult<Option<String>> {
        let ids = self.fields.layout_ids(form)?;
        let index = ids
            .iter()
            .position(|item| *item == id)
            .ok_or_else(|| EditorError::UnknownBlock(id.to_string()))?;

        Ok(ids.get(index + 1).map(|next| next.to_string()))
    }

    /// Id of the block before `id`, `None` for the first one.
    pub fn previous_block_id(&self, form: &FormData, id: &str) -> EditorResult<Option<String>> {
        let ids = self.fields.layout_ids(form)?;
        let index = ids
            .iter()
            .position(|item| *item == id)
            .ok_or_else(|| EditorError::UnknownBlock(id.to_string()))?;

        Ok(index.checked_sub(1).map(|prev| ids[prev].to_string()))
    }

    /// Remove the trailing run of placeholder blocks.
    ///
    /// An unreadable or empty layout leaves the form as it is.
    pub fn cleanup_last_placeholders(&self, form: &FormData) -> FormData {
        let (Ok(items), Ok(mut blocks)) = (self.fields.layout_items(form), self.fields.block_map_owned(form)) else {
            return form.clone();
        };

        let keep = items.len()
            - items
                .iter()
                .rev()
                .take_while(|id| blocks.get(id.as_str()).is_some_and(|b| self.ctx.is_placeholder_block(b)))
                .count();

        if keep == items.len() {
            return form.clone();
        }

        let mut items = items;
        for id in items.drain(keep..) {
            blocks.remove(&id);
        }
        tracing::debug!("cleanup_last_placeholders: {} blocks left", items.len());

        self.fields.rebuild(form, items, blocks)
    }
}

fn merge_into(target: &mut Value, patch: &Map<String, Value>) {
    match target {
        Value::Object(target) => {
            for (key, value) in patch {
                target.insert(key.clone(), value.clone());
            }
        }
        other => *other = Value::Object(patch.clone()),
    }
}
