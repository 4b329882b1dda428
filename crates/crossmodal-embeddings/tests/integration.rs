//! Integration tests for the CLIP encoders
//!
//! These tests require the model files to be downloaded. They are ignored
//! by default and can be run with:
//! cargo test -p crossmodal-embeddings --test integration -- --ignored

use crossmodal_embeddings::{
    cosine_similarity, ClipTextEncoder, ClipVisionEncoder, ImageEmbedder, ModelManager,
    TextEmbedder,
};

/// Test that the model files can be downloaded and a text encoder loads
#[test]
#[ignore = "Requires downloading model files (~350MB)"]
fn test_model_download_and_text_load() {
    let manager = ModelManager::new().expect("Failed to create model manager");
    let config = manager
        .ensure_models_available()
        .expect("Failed to download models");

    assert!(config.files_exist(), "Model files should exist after download");

    let encoder = ClipTextEncoder::new(config).expect("Failed to load text encoder");
    assert_eq!(encoder.embedding_dim(), 512);
}

/// Test text embedding dimensionality and normalization
#[test]
#[ignore = "Requires model files to be downloaded"]
fn test_text_embedding_is_normalized() {
    let manager = ModelManager::new().expect("Failed to create model manager");
    if !manager.is_available() {
        println!("Skipping test - model files not available");
        return;
    }

    let encoder = ClipTextEncoder::new(manager.config()).expect("Failed to load text encoder");
    let embedding = encoder
        .embed_text("A photo of a cat")
        .expect("Failed to embed text");

    assert_eq!(embedding.len(), 512);
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!(
        (norm - 1.0).abs() < 0.01,
        "Embedding should be L2 normalized, got norm: {}",
        norm
    );
}

/// Test that related texts are closer than unrelated ones
#[test]
#[ignore = "Requires model files to be downloaded"]
fn test_text_similarity_ordering() {
    let manager = ModelManager::new().expect("Failed to create model manager");
    if !manager.is_available() {
        println!("Skipping test - model files not available");
        return;
    }

    let encoder = ClipTextEncoder::new(manager.config()).expect("Failed to load text encoder");

    let query = encoder.embed_text("A pet animal").unwrap();
    let cat = encoder.embed_text("A cat lounging in the sun").unwrap();
    let sheet = encoder
        .embed_text("A spreadsheet of quarterly earnings")
        .unwrap();

    let cat_sim = cosine_similarity(&query, &cat);
    let sheet_sim = cosine_similarity(&query, &sheet);
    assert!(
        cat_sim > sheet_sim,
        "Expected cat ({}) to outscore spreadsheet ({})",
        cat_sim,
        sheet_sim
    );
}

/// Test that text and image embeddings share a comparable space
#[test]
#[ignore = "Requires model files and a local test image"]
fn test_cross_modal_agreement() {
    let manager = ModelManager::new().expect("Failed to create model manager");
    if !manager.is_available() {
        println!("Skipping test - model files not available");
        return;
    }

    let image_path = match std::env::var("CROSSMODAL_TEST_IMAGE") {
        Ok(p) => p,
        Err(_) => {
            println!("Skipping test - set CROSSMODAL_TEST_IMAGE to an image of a cat");
            return;
        }
    };

    let text = ClipTextEncoder::new(manager.config()).expect("Failed to load text encoder");
    let vision = ClipVisionEncoder::new(manager.config()).expect("Failed to load vision encoder");

    let image_emb = vision.embed_image(&image_path).expect("Failed to embed image");
    assert_eq!(image_emb.len(), 512);

    let matching = text.embed_text("A photo of a cat").unwrap();
    let unrelated = text.embed_text("A spreadsheet of quarterly earnings").unwrap();

    assert!(
        cosine_similarity(&image_emb, &matching) > cosine_similarity(&image_emb, &unrelated),
        "Matching text should score higher against the image"
    );
}
