//! Catalog embedding
//!
//! Turns user-supplied catalog items into embedded items, one embedding
//! per present modality, in parallel across items. The output is
//! index-stable: `result[i]` always corresponds to `items[i]`, which the
//! rest of the pipeline relies on.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crossmodal_core::{CatalogItem, EmbeddedItem, Error, Modality, Result};
use crossmodal_embeddings::{ImageEmbedder, TextEmbedder};

/// Embeds catalog items using a text and an image provider
///
/// Batch policy: embedding is all-or-nothing. Any item failure (invalid
/// item, provider error, dimension mismatch) aborts the whole catalog
/// build, so a partially embedded catalog is never published.
pub struct CatalogEmbedder {
    text: Arc<dyn TextEmbedder>,
    image: Arc<dyn ImageEmbedder>,
    embedding_dim: usize,
    parallelism: usize,
}

impl CatalogEmbedder {
    /// Create a new catalog embedder
    ///
    /// `embedding_dim` is the dimension both providers are expected to
    /// produce; every computed embedding is checked against it.
    pub fn new(
        text: Arc<dyn TextEmbedder>,
        image: Arc<dyn ImageEmbedder>,
        embedding_dim: usize,
    ) -> Self {
        Self {
            text,
            image,
            embedding_dim,
            parallelism: 0,
        }
    }

    /// Set the number of embedding threads; 0 means one per CPU
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Embed a single catalog item
    ///
    /// When both fields are present, both providers are invoked and the
    /// item is tagged [`Modality::Both`]. An item with neither field is
    /// rejected with [`Error::InvalidItem`] before any provider call.
    pub fn embed_item(&self, index: usize, item: &CatalogItem) -> Result<EmbeddedItem> {
        if !item.is_embeddable() {
            return Err(Error::InvalidItem { index });
        }

        let text_embedding = match &item.text {
            Some(text) => {
                let embedding = self
                    .text
                    .embed_text(text)
                    .map_err(|e| wrap_provider_error(e, index, Modality::Text))?;
                self.check_dimension(&embedding)?;
                Some(embedding)
            }
            None => None,
        };

        let image_embedding = match &item.image {
            Some(image_ref) => {
                let embedding = self
                    .image
                    .embed_image(image_ref)
                    .map_err(|e| wrap_provider_error(e, index, Modality::Image))?;
                self.check_dimension(&embedding)?;
                Some(embedding)
            }
            None => None,
        };

        debug!(index, "catalog item embedded");

        EmbeddedItem::from_parts(text_embedding, image_embedding)
            .ok_or(Error::InvalidItem { index })
    }

    /// Embed a whole catalog, preserving input order
    ///
    /// Items are embedded concurrently on a bounded pool; completion
    /// order does not affect result order.
    pub fn embed_catalog(&self, items: &[CatalogItem]) -> Result<Vec<EmbeddedItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let num_threads = if self.parallelism > 0 {
            self.parallelism
        } else {
            num_cpus::get()
        };

        // A scoped pool rather than the global one, so the configured
        // ceiling holds per session
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| Error::Embedding(format!("Failed to build embedding pool: {}", e)))?;

        let embedded = pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(index, item)| self.embed_item(index, item))
                .collect::<Result<Vec<_>>>()
        })?;

        info!(items = embedded.len(), threads = num_threads, "catalog embedded");
        Ok(embedded)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.embedding_dim {
            return Err(Error::DimensionMismatch {
                expected: self.embedding_dim,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

/// Attach item and modality context to a provider failure
///
/// Dimension mismatches pass through unchanged: they indicate a
/// misconfigured provider, not a failed call.
fn wrap_provider_error(error: Error, index: usize, modality: Modality) -> Error {
    match error {
        Error::DimensionMismatch { .. } => error,
        other => Error::Provider {
            index,
            modality,
            message: other.to_string(),
        },
    }
}
