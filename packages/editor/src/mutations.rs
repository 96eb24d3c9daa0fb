//! # Block Mutations
//!
//! Edit intents as plain data, so a host can queue, log or send them before
//! applying them to a form.
//!
//! ## Mutation Semantics
//!
//! ### Add
//! - New block of the given type, at `index` or appended
//! - Non-default types get a trailing placeholder
//! - The new block becomes `selected`
//!
//! ### Mutate
//! - Replaces the payload and keeps one placeholder right after it
//!
//! ### Delete
//! - Removes the block; an emptied form gets a fresh default block
//!
//! ### Cleanup
//! - Strips trailing placeholders; never fails

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use blockform_common::{BlockFields, FormData};

use crate::context::EditorContext;
use crate::{EditorError, EditorResult};

/// Structural edits of a block container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    /// Add a block of `block_type` at `index` (append when absent)
    #[serde(rename_all = "camelCase")]
    Add {
        block_type: String,
        /// `-1` also appends
        #[serde(
            default,
            deserialize_with = "append_index",
            skip_serializing_if = "Option::is_none"
        )]
        index: Option<usize>,
    },

    /// Move the block at `source` to `destination`
    Move { source: usize, destination: usize },

    /// Remove a block
    Delete { id: String },

    /// Set a block's payload, keeping a placeholder after it
    Mutate { id: String, value: Value },

    /// Insert a new block relative to `id`, optionally patching `id`
    Insert {
        id: String,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current: Option<Map<String, Value>>,
        #[serde(default)]
        offset: usize,
    },

    /// Replace a block's payload
    Change { id: String, value: Value },

    /// Drop trailing placeholder blocks
    Cleanup,
}

fn append_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<i64>::deserialize(deserializer)? {
        None | Some(-1) => Ok(None),
        Some(index) => usize::try_from(index).map(Some).map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Signed(index),
                &"a block index, or -1 to append",
            )
        }),
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// The new form
    pub form: FormData,

    /// Id of the block the mutation created, if any
    pub block_id: Option<String>,
}

impl MutationResult {
    fn form(form: FormData) -> Self {
        Self { form, block_id: None }
    }

    fn created(block_id: String, form: FormData) -> Self {
        Self {
            form,
            block_id: Some(block_id),
        }
    }
}

impl Mutation {
    /// Apply the mutation to `form`, validating it first.
    pub fn apply(&self, ctx: &EditorContext, form: &FormData) -> EditorResult<MutationResult> {
        if let Mutation::Cleanup = self {
            return Ok(MutationResult::form(ctx.cleanup_last_placeholders(form)));
        }

        self.validate(ctx, form)?;
        let editor = ctx.editor_for(form)?;
        tracing::debug!("apply {}", self.name());

        match self {
            Mutation::Add { block_type, index } => {
                let (id, form) = editor.add_block(form, block_type, *index)?;
                Ok(MutationResult::created(id, form))
            }

            Mutation::Move { source, destination } => {
                Ok(MutationResult::form(editor.move_block(form, *source, *destination)?))
            }

            Mutation::Delete { id } => Ok(MutationResult::form(editor.delete_block(form, id)?)),

            Mutation::Mutate { id, value } => {
                Ok(MutationResult::form(editor.mutate_block(form, id, value.clone())?))
            }

            Mutation::Insert {
                id,
                value,
                current,
                offset,
            } => {
                let (new_id, form) =
                    editor.insert_block_at(form, id, value.clone(), current.as_ref(), *offset)?;
                Ok(MutationResult::created(new_id, form))
            }

            Mutation::Change { id, value } => {
                Ok(MutationResult::form(editor.change_block(form, id, value.clone())?))
            }

            Mutation::Cleanup => Ok(MutationResult::form(editor.cleanup_last_placeholders(form))),
        }
    }

    /// Validate without applying
    pub fn validate(&self, ctx: &EditorContext, form: &FormData) -> EditorResult<()> {
        if let Mutation::Cleanup = self {
            return Ok(());
        }

        let fields = BlockFields::resolve(form, ctx.conventions())?;
        let items = fields.layout_ids(form)?;
        fields.block_map(form)?;

        let in_layout = |id: &str| items.contains(&id);

        match self {
            Mutation::Add { .. } | Mutation::Move { .. } | Mutation::Cleanup => Ok(()),

            Mutation::Mutate { id, .. } | Mutation::Insert { id, .. } => {
                if in_layout(id.as_str()) {
                    Ok(())
                } else {
                    Err(EditorError::UnknownBlock(id.clone()))
                }
            }

            Mutation::Delete { id } | Mutation::Change { id, .. } => {
                if in_layout(id.as_str()) || fields.block(form, id).is_some() {
                    Ok(())
                } else {
                    Err(EditorError::UnknownBlock(id.clone()))
                }
            }
        }
    }

    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Add { .. } => "add",
            Mutation::Move { .. } => "move",
            Mutation::Delete { .. } => "delete",
            Mutation::Mutate { .. } => "mutate",
            Mutation::Insert { .. } => "insert",
            Mutation::Change { .. } => "change",
            Mutation::Cleanup => "cleanup",
        }
    }
}
