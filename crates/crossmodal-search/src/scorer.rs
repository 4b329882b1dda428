//! Similarity scoring
//!
//! Scores an embedded item against a query embedding. Items carrying
//! both modalities use best-of aggregation: the maximum of the two
//! cosine similarities, so a strong match in one modality is not diluted
//! by a weak one in the other.

use crossmodal_core::{EmbeddedItem, Error, Modality, Result};
use crossmodal_embeddings::cosine_similarity;

/// Score an embedded item against a query embedding
///
/// Pure function of its inputs; the score is a cosine similarity in
/// [-1.0, 1.0]. A dimension mismatch between the query and any present
/// item embedding is rejected before the similarity primitive is called.
pub fn score(query: &[f32], item: &EmbeddedItem) -> Result<f32> {
    if let Some(text) = item.text_embedding() {
        check_dimensions(query, text)?;
    }
    if let Some(image) = item.image_embedding() {
        check_dimensions(query, image)?;
    }

    let similarity = match item.modality() {
        Modality::Text => cosine_similarity(query, item.text_embedding().unwrap_or(&[])),
        Modality::Image => cosine_similarity(query, item.image_embedding().unwrap_or(&[])),
        Modality::Both => {
            let text = cosine_similarity(query, item.text_embedding().unwrap_or(&[]));
            let image = cosine_similarity(query, item.image_embedding().unwrap_or(&[]));
            text.max(image)
        }
    };

    Ok(similarity)
}

fn check_dimensions(query: &[f32], embedding: &[f32]) -> Result<()> {
    if query.len() != embedding.len() {
        return Err(Error::DimensionMismatch {
            expected: query.len(),
            actual: embedding.len(),
        });
    }
    Ok(())
}
