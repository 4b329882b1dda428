//! Embedding provider traits
//!
//! The ranking core talks to embedding providers through these traits
//! rather than concrete ONNX types. Implementations must be shareable
//! across the threads of the catalog embedding pool.

use crossmodal_core::{Embedding, Result};

/// Produces embeddings for text strings
pub trait TextEmbedder: Send + Sync {
    /// Embed a single text string
    fn embed_text(&self, text: &str) -> Result<Embedding>;

    /// Dimension of the vectors this provider produces
    fn embedding_dim(&self) -> usize;
}

/// Produces embeddings for images
///
/// Resolution of the image reference (reading a file, fetching a URL,
/// decoding the bytes) is entirely the provider's responsibility.
pub trait ImageEmbedder: Send + Sync {
    /// Embed the image behind a locator (filesystem path or http(s) URL)
    fn embed_image(&self, image_ref: &str) -> Result<Embedding>;

    /// Dimension of the vectors this provider produces
    fn embedding_dim(&self) -> usize;
}
