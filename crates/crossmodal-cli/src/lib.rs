//! Catalog loading and result presentation for the crossmodal CLI

use std::fmt::Write as _;
use std::path::Path;

use crossmodal_core::{CatalogItem, Error, RankedResult, Result};

/// Load a catalog from a JSON file
///
/// The file holds an ordered array of `{ "text"?, "image"? }` records.
/// Item validity (at least one field present) is enforced later, at
/// embedding time, so the error can name the offending index.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogItem>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::FileSystem(format!("Failed to read catalog {:?}: {}", path, e)))?;
    let items: Vec<CatalogItem> = serde_json::from_str(&content)?;
    Ok(items)
}

/// Render ranked results as human-readable text
pub fn render_text(query: &str, results: &[RankedResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Query: {:?}", query);

    if results.is_empty() {
        let _ = writeln!(out, "  (no results)");
        return out;
    }

    for result in results {
        let _ = write!(
            out,
            "  {}. [{:.2}%]",
            result.rank, result.similarity_percent
        );
        if let Some(text) = &result.item.text {
            let _ = write!(out, " text: {:?}", text);
        }
        if let Some(image) = &result.item.image {
            let _ = write!(out, " image: {}", image);
        }
        let _ = writeln!(out);
    }

    out
}

/// Render ranked results as a JSON document
pub fn render_json(query: &str, results: &[RankedResult]) -> Result<String> {
    let doc = serde_json::json!({
        "query": query,
        "results": results,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}
