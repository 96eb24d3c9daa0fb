//! # Blockform Common
//!
//! Shared data model for block-based form data.
//!
//! A form is a JSON object carrying two dynamically named fields: a block
//! map (`id → payload`) and a block layout (`{ "items": [id, ...] }`). This
//! crate knows how to find those fields, read them back in layout order and
//! walk nested block containers. It has no opinion about block types; that
//! lives in `blockform-editor`.

pub mod error;
pub mod fields;
pub mod result;
pub mod visitor;

pub use error::*;
pub use fields::*;
pub use result::*;
pub use visitor::*;

/// Form data: the top-level document, or any block payload that embeds its
/// own blocks.
pub type FormData = serde_json::Map<String, serde_json::Value>;

/// Key carrying a block's type discriminator.
pub const TYPE_KEY: &str = "@type";

/// Returns the `@type` of a block payload, if it has one.
pub fn block_type(block: &serde_json::Value) -> Option<&str> {
    block.get(TYPE_KEY).and_then(|t| t.as_str())
}
