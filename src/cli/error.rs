//! CLI error types and conversions

use crate::config::ConfigError;
use crate::downloader::RetrievalError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Retrieval error
    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigurationError(#[from] ConfigError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output serialization error
    #[error("output error: {0}")]
    OutputError(#[from] serde_json::Error),
}
