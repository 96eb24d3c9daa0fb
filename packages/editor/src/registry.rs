//! # Block Type Registry
//!
//! Host-supplied behavior per block type. The editor treats block payloads
//! as opaque JSON plus a `@type`; anything type-specific it needs comes from
//! here.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::schema::SchemaSource;
use blockform_common::FormData;

pub type HasValueFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Computes the payload of a freshly added block: `(id, value, form) -> value`
pub type InitialValueFn = Arc<dyn Fn(&str, &Value, &FormData) -> Value + Send + Sync>;

/// Descriptor bundle of one block type
#[derive(Clone, Default)]
pub struct BlockType {
    /// Whether a payload of this type has content. Types without one always
    /// count as having a value.
    pub has_value: Option<HasValueFn>,

    pub schema: Option<SchemaSource>,

    pub initial_value: Option<InitialValueFn>,
}

impl BlockType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_has_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.has_value = Some(Arc::new(f));
        self
    }

    pub fn with_schema(mut self, schema: impl Into<SchemaSource>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_initial_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Value, &FormData) -> Value + Send + Sync + 'static,
    {
        self.initial_value = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockType")
            .field("has_value", &self.has_value.is_some())
            .field("schema", &self.schema)
            .field("initial_value", &self.initial_value.is_some())
            .finish()
    }
}

/// Block type name → descriptor
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    types: HashMap<String, BlockType>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, block_type: BlockType) -> &mut Self {
        self.types.insert(name.into(), block_type);
        self
    }

    pub fn with(mut self, name: impl Into<String>, block_type: BlockType) -> Self {
        self.register(name, block_type);
        self
    }

    pub fn get(&self, name: &str) -> Option<&BlockType> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
