use thiserror::Error;

/// Errors raised while reading the block fields of a form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("no blocks field")]
    NoBlocksField,

    #[error("no blocks layout field")]
    NoLayoutField,

    #[error("invalid blocks layout in '{0}'")]
    InvalidLayout(String),

    #[error("invalid blocks map in '{0}'")]
    InvalidBlocks(String),
}
