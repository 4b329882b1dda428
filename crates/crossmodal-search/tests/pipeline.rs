//! End-to-end pipeline tests over stub providers
//!
//! These tests exercise the full embed-score-rank-present pipeline
//! without model files, using providers that return hand-picked vectors
//! keyed by their input.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossmodal_core::{CatalogItem, Embedding, Error, Result};
use crossmodal_embeddings::{ImageEmbedder, TextEmbedder};
use crossmodal_search::SearchSession;

/// Text provider returning fixed vectors for known strings
struct StubText {
    vectors: HashMap<String, Vec<f32>>,
    dim: usize,
    calls: AtomicUsize,
}

impl StubText {
    fn new(dim: usize, entries: &[(&str, Vec<f32>)]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            dim,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextEmbedder for StubText {
    fn embed_text(&self, text: &str) -> Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| Error::Embedding(format!("no stub vector for '{}'", text)))
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }
}

/// Image provider returning fixed vectors for known locators
struct StubImage {
    vectors: HashMap<String, Vec<f32>>,
    dim: usize,
}

impl StubImage {
    fn new(dim: usize, entries: &[(&str, Vec<f32>)]) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            dim,
        }
    }
}

impl ImageEmbedder for StubImage {
    fn embed_image(&self, image_ref: &str) -> Result<Embedding> {
        self.vectors
            .get(image_ref)
            .cloned()
            .ok_or_else(|| Error::Embedding(format!("no stub vector for '{}'", image_ref)))
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }
}

/// A pet-themed embedded space: dimension 0 is "animal-ness",
/// dimension 1 is "office-ness", dimension 2 is "outdoors-ness".
fn pet_session() -> (Arc<StubText>, SearchSession) {
    let text = Arc::new(StubText::new(
        3,
        &[
            ("A cat lounging in the sun", vec![0.9, 0.0, 0.4]),
            ("A dog playing in the park", vec![0.8, 0.0, 0.6]),
            ("A pet animal", vec![1.0, 0.0, 0.1]),
            ("A spreadsheet of quarterly earnings", vec![0.0, 1.0, 0.0]),
        ],
    ));
    let image = Arc::new(StubImage::new(
        3,
        &[
            ("cat.jpg", vec![0.95, 0.0, 0.3]),
            ("dog.jpg", vec![0.85, 0.0, 0.5]),
            ("chart.png", vec![0.05, 0.9, 0.0]),
        ],
    ));

    let items = vec![
        CatalogItem::new()
            .with_text("A cat lounging in the sun")
            .with_image("cat.jpg"),
        CatalogItem::new()
            .with_text("A dog playing in the park")
            .with_image("dog.jpg"),
        CatalogItem::new().with_image("chart.png"),
    ];

    let session = SearchSession::build(text.clone(), image, items, 2).unwrap();
    (text, session)
}

#[test]
fn test_pet_query_returns_one_match() {
    let (_, session) = pet_session();
    let results = session.search("A pet animal", 1).unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].item_index < 2, "a pet item should win");
    assert_eq!(results[0].rank, 1);
    assert!(results[0].similarity_percent >= 0.0);
    assert!(results[0].similarity_percent <= 100.0);
}

#[test]
fn test_related_query_outscores_unrelated() {
    let (_, session) = pet_session();

    let pet = session.search("A pet animal", 1).unwrap();
    let sheet = session
        .search("A spreadsheet of quarterly earnings", 1)
        .unwrap();

    // The best pet score comes from a pet item, the spreadsheet query's
    // best match is the chart image; the pet query scores higher against
    // its winner than against the unrelated catalog as a whole
    let pet_vs_pet = pet[0].similarity_percent;
    let sheet_results = session.search("A spreadsheet of quarterly earnings", 3).unwrap();
    let sheet_vs_pets = sheet_results
        .iter()
        .find(|r| r.item_index < 2)
        .map(|r| r.similarity_percent)
        .unwrap();
    assert!(pet_vs_pet > sheet_vs_pets);
    assert_eq!(sheet[0].item_index, 2, "chart image should win for the spreadsheet query");
}

#[test]
fn test_image_only_item_ranks_by_relevance_not_position() {
    let (_, session) = pet_session();
    let results = session.search("A pet animal", 3).unwrap();

    assert_eq!(results.len(), 3);
    // The image-only chart item sits last despite being a valid item
    assert_eq!(results[2].item_index, 2);
    // Ordering is by non-increasing similarity
    for pair in results.windows(2) {
        assert!(pair[0].similarity_percent >= pair[1].similarity_percent);
    }
}

#[test]
fn test_search_is_repeatable() {
    let (_, session) = pet_session();
    let first = session.search("A pet animal", 3).unwrap();
    let second = session.search("A pet animal", 3).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_failed_query_leaves_session_usable() {
    let (_, session) = pet_session();

    // No stub vector for this query: the provider fails
    assert!(session.search("unknown query", 1).is_err());

    // The embedded catalog is untouched; the next query succeeds
    let results = session.search("A pet animal", 1).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn test_empty_query_rejected_before_provider_call() {
    let (text, session) = pet_session();
    let calls_before = text.calls();

    let err = session.search("   ", 5).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(text.calls(), calls_before, "provider must not be called");
}

#[test]
fn test_zero_top_k_rejected_before_provider_call() {
    let (text, session) = pet_session();
    let calls_before = text.calls();

    let err = session.search("A pet animal", 0).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(text.calls(), calls_before);
}

#[test]
fn test_top_k_larger_than_catalog() {
    let (_, session) = pet_session();
    let results = session.search("A pet animal", 50).unwrap();
    assert_eq!(results.len(), session.len());
}

#[test]
fn test_empty_catalog_session() {
    let text = Arc::new(StubText::new(3, &[("anything", vec![1.0, 0.0, 0.0])]));
    let image = Arc::new(StubImage::new(3, &[]));
    let session = SearchSession::build(text, image, Vec::new(), 1).unwrap();

    let results = session.search("anything", 5).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_invalid_item_aborts_session_build() {
    let text = Arc::new(StubText::new(3, &[("fine", vec![1.0, 0.0, 0.0])]));
    let image = Arc::new(StubImage::new(3, &[]));
    let items = vec![
        CatalogItem::new().with_text("fine"),
        CatalogItem::new(), // neither field
    ];

    let err = SearchSession::build(text, image, items, 1).unwrap_err();
    assert!(matches!(err, Error::InvalidItem { index: 1 }));
}

#[test]
fn test_results_serialize_to_json() {
    let (_, session) = pet_session();
    let results = session.search("A pet animal", 2).unwrap();

    let json = serde_json::to_string(&results).unwrap();
    assert!(json.contains("\"rank\":1"));
    assert!(json.contains("\"item_index\""));
    assert!(json.contains("\"similarity_percent\""));
}

#[test]
fn test_best_of_aggregation_visible_end_to_end() {
    // A query that matches the image vector of item 0 far better than
    // its text vector must still surface item 0 at full strength
    let text = Arc::new(StubText::new(
        2,
        &[("query", vec![1.0, 0.0]), ("weak text", vec![0.0, 1.0])],
    ));
    let image = Arc::new(StubImage::new(2, &[("strong.jpg", vec![1.0, 0.0])]));
    let items = vec![CatalogItem::new()
        .with_text("weak text")
        .with_image("strong.jpg")];

    let session = SearchSession::build(text, image, items, 1).unwrap();
    let results = session.search("query", 1).unwrap();

    assert_eq!(results[0].similarity_percent, 100.0);
}
