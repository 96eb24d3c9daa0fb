use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use blockform_editor::{
    BlockRegistry, BlockSchema, BlockType, EditorContext, EditorSettings, SequentialIds, UuidIds,
    DEFAULT_BLOCK_TYPE,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_CONFIG_NAME: &str = "blockform.config.json";

/// Blockform configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Default block type, field conventions, traversal depth
    #[serde(flatten)]
    pub editor: EditorSettings,

    /// Per-type behavior
    #[serde(default = "default_block_types")]
    pub block_types: BTreeMap<String, BlockTypeConfig>,
}

/// Declarative stand-in for a block type's registry entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTypeConfig {
    /// The block has a value iff one of these fields is non-empty. Types
    /// without value fields always have a value.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_fields: Vec<String>,

    /// Settings schema, for defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<BlockSchema>,

    /// Fields merged into every new block of this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Map<String, Value>>,
}

fn default_block_types() -> BTreeMap<String, BlockTypeConfig> {
    let mut types = BTreeMap::new();
    types.insert(
        DEFAULT_BLOCK_TYPE.to_string(),
        BlockTypeConfig {
            value_fields: vec!["plaintext".to_string()],
            ..Default::default()
        },
    );
    types
}

/// How new block ids are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IdStrategy {
    /// Random v4 UUIDs
    Uuid,
    /// block-0, block-1, ... (reproducible)
    Sequential,
}

impl Config {
    /// Load config from `explicit`, or from the working directory
    pub fn load(cwd: &str, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow!("Config file not found: {}", path.display()));
                }
                path.to_path_buf()
            }
            None => PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config {}", config_path.display()))?;
            tracing::debug!("loaded config from {}", config_path.display());
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Build the block type registry this config describes
    pub fn registry(&self) -> BlockRegistry {
        let mut registry = BlockRegistry::new();

        for (name, type_config) in &self.block_types {
            let mut block_type = BlockType::new();

            if !type_config.value_fields.is_empty() {
                let fields = type_config.value_fields.clone();
                block_type = block_type.with_has_value(move |block| {
                    fields
                        .iter()
                        .any(|field| block.get(field).is_some_and(field_has_value))
                });
            }

            if let Some(schema) = &type_config.schema {
                block_type = block_type.with_schema(schema.clone());
            }

            if let Some(initial) = &type_config.initial_value {
                let initial = initial.clone();
                block_type = block_type.with_initial_value(move |_id, value, _form| {
                    let mut value = value.clone();
                    if let Value::Object(block) = &mut value {
                        for (key, default) in &initial {
                            block.entry(key.clone()).or_insert_with(|| default.clone());
                        }
                    }
                    value
                });
            }

            registry.register(name.clone(), block_type);
        }

        registry
    }

    /// Editor context for this config
    pub fn context(&self, ids: IdStrategy) -> EditorContext {
        let ctx = EditorContext::new(self.editor.clone()).with_registry(self.registry());
        match ids {
            IdStrategy::Uuid => ctx.with_id_generator(UuidIds),
            IdStrategy::Sequential => ctx.with_id_generator(SequentialIds::new("block")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorSettings::default(),
            block_types: default_block_types(),
        }
    }
}

/// Non-null, non-blank string, non-empty array/object; numbers and
/// booleans always count.
fn field_has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "defaultBlockType": "text",
            "fields": { "reservedKey": "site.blocks" },
            "maxDepth": 4,
            "blockTypes": {
                "text": { "valueFields": ["text"] },
                "image": {
                    "valueFields": ["url"],
                    "schema": { "properties": { "align": { "default": "center" } } },
                    "initialValue": { "size": "l" }
                }
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.editor.default_block_type, "text");
        assert_eq!(config.editor.fields.reserved_key, "site.blocks");
        assert_eq!(config.editor.fields.blocks_suffix, "blocks");
        assert_eq!(config.editor.max_depth, 4);
        assert_eq!(config.block_types.len(), 2);
        assert_eq!(
            config.block_types["image"].initial_value.as_ref().unwrap()["size"],
            "l"
        );
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.default_block_type, "slate");
        assert_eq!(config.block_types["slate"].value_fields, vec!["plaintext"]);

        let parsed: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.editor, config.editor);
        assert_eq!(parsed.block_types, config.block_types);
    }

    #[test]
    fn test_registry_value_fields() {
        let ctx = Config::default().context(IdStrategy::Sequential);

        assert!(ctx.is_placeholder_block(&json!({ "@type": "slate" })));
        assert!(ctx.is_placeholder_block(&json!({ "@type": "slate", "plaintext": " " })));
        assert!(!ctx.is_placeholder_block(&json!({ "@type": "slate", "plaintext": "x" })));
    }

    #[test]
    fn test_registry_initial_value() {
        let config: Config = serde_json::from_value(json!({
            "blockTypes": { "image": { "initialValue": { "size": "l" } } }
        }))
        .unwrap();
        let ctx = config.context(IdStrategy::Sequential);
        let form = ctx.empty_blocks_form();
        let editor = ctx.editor_for(&form).unwrap();

        let (id, next) = editor.add_block(&form, "image", None).unwrap();
        assert_eq!(next["blocks"][&id], json!({ "@type": "image", "size": "l" }));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let result = Config::load(".", Some(Path::new("/nonexistent/blockform.config.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_field_has_value() {
        assert!(!field_has_value(&Value::Null));
        assert!(!field_has_value(&json!("")));
        assert!(!field_has_value(&json!([])));
        assert!(field_has_value(&json!(0)));
        assert!(field_has_value(&json!({ "a": 1 })));
    }
}
