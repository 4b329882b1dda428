//! Lazy-loading wrappers for the CLIP encoders
//!
//! Session construction loads the ONNX graphs into memory, which can take
//! seconds. These wrappers store the configuration and defer loading
//! until the first embedding request, so a session whose catalog is
//! text-only never pays for the vision model (and vice versa).

use std::sync::OnceLock;

use crossmodal_core::{Embedding, Error, Result};

use crate::model::ClipModelConfig;
use crate::provider::{ImageEmbedder, TextEmbedder};
use crate::text::ClipTextEncoder;
use crate::vision::ClipVisionEncoder;

/// Lazily initialized CLIP text encoder
///
/// Thread-safe: concurrent `embed_text` calls load the model exactly
/// once. Initialization failures are cached, so a broken configuration
/// fails fast on every subsequent call instead of retrying the load.
pub struct LazyClipText {
    config: ClipModelConfig,
    encoder: OnceLock<std::result::Result<ClipTextEncoder, String>>,
}

impl LazyClipText {
    /// Store the configuration without loading the model
    pub fn new(config: ClipModelConfig) -> Self {
        Self {
            config,
            encoder: OnceLock::new(),
        }
    }

    fn ensure_loaded(&self) -> Result<&ClipTextEncoder> {
        let result = self
            .encoder
            .get_or_init(|| ClipTextEncoder::new(self.config.clone()).map_err(|e| e.to_string()));

        match result {
            Ok(encoder) => Ok(encoder),
            Err(e) => Err(Error::Embedding(e.clone())),
        }
    }

    /// Check if the encoder has been loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self.encoder.get(), Some(Ok(_)))
    }

    /// Check if the model files exist without loading them
    pub fn is_available(&self) -> bool {
        self.config.text_model_path.exists() && self.config.tokenizer_path.exists()
    }
}

impl TextEmbedder for LazyClipText {
    fn embed_text(&self, text: &str) -> Result<Embedding> {
        self.ensure_loaded()?.embed_text(text)
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }
}

/// Lazily initialized CLIP vision encoder
pub struct LazyClipVision {
    config: ClipModelConfig,
    encoder: OnceLock<std::result::Result<ClipVisionEncoder, String>>,
}

impl LazyClipVision {
    /// Store the configuration without loading the model
    pub fn new(config: ClipModelConfig) -> Self {
        Self {
            config,
            encoder: OnceLock::new(),
        }
    }

    fn ensure_loaded(&self) -> Result<&ClipVisionEncoder> {
        let result = self
            .encoder
            .get_or_init(|| ClipVisionEncoder::new(self.config.clone()).map_err(|e| e.to_string()));

        match result {
            Ok(encoder) => Ok(encoder),
            Err(e) => Err(Error::Embedding(e.clone())),
        }
    }

    /// Check if the encoder has been loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self.encoder.get(), Some(Ok(_)))
    }

    /// Check if the model file exists without loading it
    pub fn is_available(&self) -> bool {
        self.config.vision_model_path.exists()
    }
}

impl ImageEmbedder for LazyClipVision {
    fn embed_image(&self, image_ref: &str) -> Result<Embedding> {
        self.ensure_loaded()?.embed_image(image_ref)
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }
}
