//! Stack-limit configuration errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    #[error("unknown block type: {0}")]
    UnresolvedBlock(String),

    #[error("stack limit for {block} must be at least 1")]
    ZeroLimit { block: String },
}

impl LimitError {
    /// Name of the block the error refers to.
    pub fn block(&self) -> &str {
        match self {
            LimitError::UnresolvedBlock(name) => name,
            LimitError::ZeroLimit { block } => block,
        }
    }
}
