//! Ranking
//!
//! Scores every embedded catalog item against a query embedding and
//! returns the top-K matches in a deterministic, total order.

use std::cmp::Ordering;

use tracing::debug;

use crossmodal_core::{EmbeddedItem, Error, Match, Result};

use crate::scorer::score;

/// Rank a catalog against a query embedding
///
/// Returns the first `min(top_k, catalog.len())` matches sorted by
/// descending score. Equal scores keep their original catalog order
/// (stable sort), so repeated calls produce identical output. An empty
/// catalog yields an empty result; `top_k == 0` is rejected.
pub fn rank(query: &[f32], catalog: &[EmbeddedItem], top_k: usize) -> Result<Vec<Match>> {
    if top_k == 0 {
        return Err(Error::InvalidArgument(
            "top_k must be greater than zero".into(),
        ));
    }

    let mut matches = catalog
        .iter()
        .enumerate()
        .map(|(index, item)| score(query, item).map(|score| Match { index, score }))
        .collect::<Result<Vec<_>>>()?;

    // Stable sort keeps catalog order for equal scores
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    matches.truncate(top_k);

    debug!(results = matches.len(), top_k, "ranking complete");
    Ok(matches)
}
