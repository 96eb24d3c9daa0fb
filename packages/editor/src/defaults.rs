//! Schema defaults for block data

use serde_json::{Map, Value};

use blockform_common::block_type;

use crate::context::EditorContext;
use crate::schema::{BlockSchema, Intl, SchemaContext};

/// Fill every property missing from `data` with its schema default.
///
/// Keys already present in `data` win, even when their value is `null`.
/// Anything other than an object comes back unchanged.
pub fn apply_schema_defaults(data: &Value, schema: &BlockSchema) -> Value {
    let Value::Object(existing) = data else {
        return data.clone();
    };

    let mut merged = Map::with_capacity(existing.len() + schema.properties.len());
    for (name, default) in schema.defaults() {
        if !existing.contains_key(name) {
            merged.insert(name.clone(), default.clone());
        }
    }
    for (key, value) in existing {
        merged.insert(key.clone(), value.clone());
    }

    Value::Object(merged)
}

/// Inputs of [`EditorContext::apply_block_defaults`]
#[derive(Debug, Clone, Copy)]
pub struct BlockDefaults<'a> {
    pub data: &'a Value,
    pub intl: &'a Intl,

    /// Whatever else the host wants dynamic schemas to see
    pub extra: &'a Map<String, Value>,
}

impl EditorContext {
    /// Apply the defaults declared by the schema of the block's type.
    ///
    /// Dynamic schemas are evaluated against the block first, then the
    /// result goes through the schema enhancer. Types without a schema
    /// leave the data untouched.
    pub fn apply_block_defaults(&self, args: BlockDefaults<'_>) -> Value {
        let Some(source) = block_type(args.data)
            .and_then(|t| self.registry().get(t))
            .and_then(|t| t.schema.as_ref())
        else {
            return args.data.clone();
        };

        let mut schema = source.resolve(&SchemaContext {
            data: args.data,
            intl: args.intl,
            extra: args.extra,
        });

        if let Some(enhance) = self.schema_enhancer() {
            schema = enhance(schema, args.data, args.intl);
        }

        tracing::trace!(
            "apply_block_defaults: {} defaults for {:?}",
            schema.defaults().count(),
            block_type(args.data)
        );

        apply_schema_defaults(args.data, &schema)
    }
}
