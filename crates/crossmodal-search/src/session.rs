//! Search session
//!
//! Owns the embedded catalog for repeated queries. The catalog is
//! embedded once at build time and never mutated afterwards, so queries
//! can run back to back (or concurrently) without locking. A failed
//! query leaves the session intact for subsequent queries.

use std::sync::Arc;

use tracing::{debug, instrument};

use crossmodal_core::{CatalogItem, EmbeddedItem, Error, RankedResult, Result};
use crossmodal_embeddings::{ImageEmbedder, TextEmbedder};

use crate::catalog::CatalogEmbedder;
use crate::ranker::rank;

/// A searchable session over an embedded catalog
pub struct SearchSession {
    text: Arc<dyn TextEmbedder>,
    items: Vec<CatalogItem>,
    embedded: Vec<EmbeddedItem>,
    embedding_dim: usize,
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("items", &self.items.len())
            .field("embedded", &self.embedded.len())
            .field("embedding_dim", &self.embedding_dim)
            .finish_non_exhaustive()
    }
}

impl SearchSession {
    /// Embed a catalog and build a session over it
    ///
    /// Fails (and builds nothing) if any item is invalid or any provider
    /// call fails; see [`CatalogEmbedder`] for the batch policy.
    /// `parallelism` bounds the embedding pool; 0 means one thread per CPU.
    pub fn build(
        text: Arc<dyn TextEmbedder>,
        image: Arc<dyn ImageEmbedder>,
        items: Vec<CatalogItem>,
        parallelism: usize,
    ) -> Result<Self> {
        let embedding_dim = text.embedding_dim();
        let embedder = CatalogEmbedder::new(text.clone(), image, embedding_dim)
            .with_parallelism(parallelism);
        let embedded = embedder.embed_catalog(&items)?;

        Ok(Self {
            text,
            items,
            embedded,
            embedding_dim,
        })
    }

    /// Number of items in the catalog
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The original catalog items, in input order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Run a text query against the catalog
    ///
    /// Returns up to `top_k` results ordered by descending similarity.
    /// Empty queries and `top_k == 0` are rejected before any provider
    /// call is made.
    #[instrument(skip(self), level = "debug")]
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<RankedResult>> {
        if query.trim().is_empty() {
            return Err(Error::InvalidArgument("query must not be empty".into()));
        }
        if top_k == 0 {
            return Err(Error::InvalidArgument(
                "top_k must be greater than zero".into(),
            ));
        }

        let query_embedding = self.text.embed_text(query)?;
        if query_embedding.len() != self.embedding_dim {
            return Err(Error::DimensionMismatch {
                expected: self.embedding_dim,
                actual: query_embedding.len(),
            });
        }

        let matches = rank(&query_embedding, &self.embedded, top_k)?;
        debug!(query, results = matches.len(), "query ranked");

        Ok(matches
            .into_iter()
            .enumerate()
            .map(|(position, m)| RankedResult {
                rank: position + 1,
                item_index: m.index,
                similarity_percent: similarity_percent(m.score),
                item: self.items[m.index].clone(),
            })
            .collect())
    }
}

/// Express a cosine score as a percentage rounded to two decimals
fn similarity_percent(score: f32) -> f64 {
    (score as f64 * 10000.0).round() / 100.0
}
