use thiserror::Error;

use crate::query_builder::QueryError;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for listing-query
#[derive(Error, Debug)]
pub enum Error {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised from inside a post-composition hook
    #[error("Query builder hook failed: {0}")]
    Hook(#[from] anyhow::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn hook(msg: impl Into<String>) -> Self {
        Self::Hook(anyhow::anyhow!(msg.into()))
    }

    /// Check if this error came out of a post-composition hook
    pub fn is_hook_error(&self) -> bool {
        matches!(self, Self::Hook(_))
    }
}
