//! # Field Resolution
//!
//! Locates the block map and block layout inside a form.
//!
//! Field names are not fixed: a document keeps its blocks under `blocks` /
//! `blocks_layout`, but a block embedding its own sub-document may use any
//! key ending with the same suffixes. Resolution scans the form's keys once
//! and yields a [`BlockFields`] pair that every operation then threads
//! through, so the scan never happens twice for one edit.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{FormData, FormError, FormResult};

pub const DEFAULT_BLOCKS_SUFFIX: &str = "blocks";
pub const DEFAULT_LAYOUT_SUFFIX: &str = "blocks_layout";
pub const DEFAULT_RESERVED_KEY: &str = "volto.blocks";

/// Key of the ordered id list inside a layout object.
pub const ITEMS_KEY: &str = "items";

/// Naming conventions used to discover block fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConventions {
    /// Suffix of the block map field
    #[serde(default = "default_blocks_suffix")]
    pub blocks_suffix: String,

    /// Suffix of the block layout field
    #[serde(default = "default_layout_suffix")]
    pub layout_suffix: String,

    /// Key that matches a suffix but never holds blocks
    #[serde(default = "default_reserved_key")]
    pub reserved_key: String,
}

fn default_blocks_suffix() -> String {
    DEFAULT_BLOCKS_SUFFIX.to_string()
}

fn default_layout_suffix() -> String {
    DEFAULT_LAYOUT_SUFFIX.to_string()
}

fn default_reserved_key() -> String {
    DEFAULT_RESERVED_KEY.to_string()
}

impl Default for FieldConventions {
    fn default() -> Self {
        Self {
            blocks_suffix: default_blocks_suffix(),
            layout_suffix: default_layout_suffix(),
            reserved_key: default_reserved_key(),
        }
    }
}

/// First key (in document order) ending with the blocks suffix
pub fn get_blocks_fieldname<'f>(form: &'f FormData, conventions: &FieldConventions) -> Option<&'f str> {
    find_field(form, &conventions.blocks_suffix, &conventions.reserved_key)
}

/// First key (in document order) ending with the layout suffix
pub fn get_blocks_layout_fieldname<'f>(
    form: &'f FormData,
    conventions: &FieldConventions,
) -> Option<&'f str> {
    find_field(form, &conventions.layout_suffix, &conventions.reserved_key)
}

/// True if the form has a block map field
pub fn has_blocks_data(form: &FormData, conventions: &FieldConventions) -> bool {
    get_blocks_fieldname(form, conventions).is_some()
}

fn find_field<'f>(form: &'f FormData, suffix: &str, reserved: &str) -> Option<&'f str> {
    form.keys()
        .map(String::as_str)
        .find(|key| *key != reserved && key.ends_with(suffix))
}

/// Resolved names of the block map and block layout fields of one form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockFields {
    pub blocks: String,
    pub layout: String,
}

impl BlockFields {
    pub fn new(blocks: impl Into<String>, layout: impl Into<String>) -> Self {
        Self {
            blocks: blocks.into(),
            layout: layout.into(),
        }
    }

    /// Discover both fields of `form`.
    pub fn resolve(form: &FormData, conventions: &FieldConventions) -> FormResult<Self> {
        let blocks = get_blocks_fieldname(form, conventions).ok_or(FormError::NoBlocksField)?;
        let layout = get_blocks_layout_fieldname(form, conventions).ok_or(FormError::NoLayoutField)?;
        Ok(Self::new(blocks, layout))
    }

    /// The plain suffixes used as field names, for freshly created forms.
    pub fn conventional(conventions: &FieldConventions) -> Self {
        Self::new(&conventions.blocks_suffix, &conventions.layout_suffix)
    }

    /// The block map, or `None` when the field is missing or `null`.
    pub fn block_map<'f>(&self, form: &'f FormData) -> FormResult<Option<&'f FormData>> {
        match form.get(&self.blocks) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(FormError::InvalidBlocks(self.blocks.clone())),
        }
    }

    /// Owned copy of the block map (empty when missing).
    pub fn block_map_owned(&self, form: &FormData) -> FormResult<FormData> {
        Ok(self.block_map(form)?.cloned().unwrap_or_default())
    }

    /// Payload of one block.
    pub fn block<'f>(&self, form: &'f FormData, id: &str) -> Option<&'f Value> {
        form.get(&self.blocks).and_then(|blocks| blocks.get(id))
    }

    /// Layout ids in order. A missing layout or `items` list reads as empty.
    pub fn layout_ids<'f>(&self, form: &'f FormData) -> FormResult<Vec<&'f str>> {
        let items = match form.get(&self.layout) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Object(layout)) => layout.get(ITEMS_KEY),
            Some(_) => return Err(FormError::InvalidLayout(self.layout.clone())),
        };

        match items {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| FormError::InvalidLayout(self.layout.clone()))
                })
                .collect(),
            Some(_) => Err(FormError::InvalidLayout(self.layout.clone())),
        }
    }

    /// Owned copy of the layout ids.
    pub fn layout_items(&self, form: &FormData) -> FormResult<Vec<String>> {
        Ok(self
            .layout_ids(form)?
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Position of `id` in the layout.
    pub fn position(&self, form: &FormData, id: &str) -> FormResult<Option<usize>> {
        Ok(self.layout_ids(form)?.iter().position(|item| *item == id))
    }

    /// Build a new form from `form` with the block map and layout items
    /// replaced.
    ///
    /// Every other key of `form` is copied in its original position, and so
    /// is every other key of the layout object.
    pub fn rebuild(&self, form: &FormData, items: Vec<String>, blocks: FormData) -> FormData {
        let mut items = Some(items);
        let mut blocks = Some(blocks);
        let mut next = Map::with_capacity(form.len() + 2);

        for (key, value) in form {
            if *key == self.blocks {
                if let Some(blocks) = blocks.take() {
                    next.insert(key.clone(), Value::Object(blocks));
                }
            } else if *key == self.layout {
                if let Some(items) = items.take() {
                    next.insert(key.clone(), layout_with_items(Some(value), items));
                }
            } else {
                next.insert(key.clone(), value.clone());
            }
        }

        if let Some(blocks) = blocks {
            next.insert(self.blocks.clone(), Value::Object(blocks));
        }
        if let Some(items) = items {
            next.insert(self.layout.clone(), layout_with_items(None, items));
        }

        next
    }
}

fn layout_with_items(previous: Option<&Value>, items: Vec<String>) -> Value {
    let mut layout = match previous {
        Some(Value::Object(layout)) => layout.clone(),
        _ => Map::new(),
    };
    layout.insert(
        ITEMS_KEY.to_string(),
        Value::Array(items.into_iter().map(Value::String).collect()),
    );
    Value::Object(layout)
}

/// Ordered `(id, payload)` pairs of a form.
///
/// Layout ids without a payload are skipped.
pub fn get_blocks<'f>(form: &'f FormData, fields: &BlockFields) -> FormResult<Vec<(&'f str, &'f Value)>> {
    let blocks = fields.block_map(form)?;
    let ids = fields.layout_ids(form)?;

    let mut pairs = Vec::with_capacity(ids.len());
    for id in ids {
        match blocks.and_then(|blocks| blocks.get(id)) {
            Some(block) => pairs.push((id, block)),
            None => tracing::warn!("layout '{}' references missing block {}", fields.layout, id),
        }
    }

    Ok(pairs)
}
