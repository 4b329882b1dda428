//! Error types for crossmodal

use thiserror::Error;

use crate::types::Modality;

/// Main error type for crossmodal operations
#[derive(Error, Debug)]
pub enum Error {
    /// A catalog item carries neither text nor an image reference.
    ///
    /// Raised at catalog embedding time so that index correspondence
    /// between the input catalog and the embedded catalog is never
    /// silently broken.
    #[error("catalog item {index} has neither text nor an image reference")]
    InvalidItem { index: usize },

    /// An embedding provider failed for a specific item and modality.
    #[error("{modality} embedding failed for catalog item {index}: {message}")]
    Provider {
        index: usize,
        modality: Modality,
        message: String,
    },

    /// Embeddings from different sources do not share a dimension.
    ///
    /// Indicates a provider misconfiguration, not a data condition.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A caller-supplied argument was rejected before any provider call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for crossmodal operations
pub type Result<T> = std::result::Result<T, Error>;
