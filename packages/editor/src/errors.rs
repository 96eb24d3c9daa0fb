//! Error types for the editor

use blockform_common::FormError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Malformed document: {0}")]
    Malformed(#[from] FormError),

    #[error("Unknown block id: {0}")]
    UnknownBlock(String),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
