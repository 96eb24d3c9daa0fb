//! # Blockform Editor
//!
//! Pure editing engine for block-based form data.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: UI state, storage, undo history       │
//! └─────────────────────────────────────────────┘
//!            ↓ form + intent       ↑ new form
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditorContext + BlockEditor         │
//! │  - Placeholder policy                       │
//! │  - Add / move / delete / insert / mutate    │
//! │  - Mutation intents (serde)                 │
//! │  - Schema defaults                          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ common: field resolution, get_blocks, BFS   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Copy on write**: operations borrow a form and return a new one
//! 2. **Layout and map move together**: no orphan on either side
//! 3. **Explicit context**: default type, registry and id source are passed in,
//!    never global
//! 4. **Loud on unknown ids**: see [`EditorError::UnknownBlock`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blockform_editor::{EditorContext, EditorSettings};
//!
//! let ctx = EditorContext::new(EditorSettings::default());
//! let form = ctx.empty_blocks_form();
//!
//! let editor = ctx.editor_for(&form)?;
//! let (id, form) = editor.add_block(&form, "image", None)?;
//! let form = editor.mutate_block(&form, &id, json!({ "@type": "image", "url": "/a.png" }))?;
//!
//! // Before saving
//! let form = ctx.cleanup_last_placeholders(&form);
//! ```

mod blocks;
mod context;
mod defaults;
mod errors;
mod ids;
mod mutations;
mod registry;
mod schema;

pub use blocks::{BlockEditor, SELECTED_KEY};
pub use context::{EditorContext, EditorSettings, DEFAULT_BLOCK_TYPE};
pub use defaults::{apply_schema_defaults, BlockDefaults};
pub use errors::{EditorError, EditorResult};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use mutations::{Mutation, MutationResult};
pub use registry::{BlockRegistry, BlockType, HasValueFn, InitialValueFn};
pub use schema::{BlockSchema, Fieldset, Intl, SchemaContext, SchemaEnhancer, SchemaFn, SchemaSource};

// Re-export common types for convenience
pub use blockform_common::{
    get_blocks, get_blocks_fieldname, get_blocks_layout_fieldname, has_blocks_data, BlockFields,
    BlockVisitor, FieldConventions, FormData, FormError,
};
