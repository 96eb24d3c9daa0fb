//! # Block Schemas
//!
//! Per-type settings schemas as the host declares them. The editor only
//! reads the `default` of each property; everything else is carried for the
//! host's form renderer.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Settings schema of one block type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fieldsets: Vec<Fieldset>,

    /// Property name → property definition (`title`, `widget`, `default`, ...)
    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fieldset {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub fields: Vec<String>,
}

impl BlockSchema {
    /// Properties that declare a `default`, in declaration order.
    ///
    /// An explicit `"default": null` counts as a default.
    pub fn defaults(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.properties
            .iter()
            .filter_map(|(name, property)| property.get("default").map(|default| (name, default)))
    }
}

/// Locale handle handed to dynamic schemas and the schema enhancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intl {
    pub locale: String,
}

impl Default for Intl {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
        }
    }
}

impl Intl {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }
}

/// Inputs of a dynamic schema
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    pub data: &'a Value,
    pub intl: &'a Intl,
    pub extra: &'a Map<String, Value>,
}

pub type SchemaFn = Arc<dyn Fn(&SchemaContext<'_>) -> BlockSchema + Send + Sync>;

/// Hook run on every resolved schema: `(schema, form_data, intl) -> schema`
pub type SchemaEnhancer = Arc<dyn Fn(BlockSchema, &Value, &Intl) -> BlockSchema + Send + Sync>;

/// A schema that is either fixed or computed from the block being edited
#[derive(Clone)]
pub enum SchemaSource {
    Static(BlockSchema),
    Dynamic(SchemaFn),
}

impl SchemaSource {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&SchemaContext<'_>) -> BlockSchema + Send + Sync + 'static,
    {
        SchemaSource::Dynamic(Arc::new(f))
    }

    pub fn resolve(&self, context: &SchemaContext<'_>) -> BlockSchema {
        match self {
            SchemaSource::Static(schema) => schema.clone(),
            SchemaSource::Dynamic(f) => f(context),
        }
    }
}

impl From<BlockSchema> for SchemaSource {
    fn from(schema: BlockSchema) -> Self {
        SchemaSource::Static(schema)
    }
}

impl fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Static(schema) => f.debug_tuple("Static").field(schema).finish(),
            SchemaSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}
