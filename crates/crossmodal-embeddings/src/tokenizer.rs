//! Tokenization for the CLIP text encoder

use std::fmt;
use std::path::Path;

use tokenizers::{
    PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer as HfTokenizer,
    TruncationDirection, TruncationParams, TruncationStrategy,
};
use tracing::debug;

use crossmodal_core::{Error, Result};

/// Tokenized text ready for the ONNX text encoder
#[derive(Debug, Clone)]
pub struct TokenizedText {
    /// Token IDs, padded to the fixed sequence length
    pub input_ids: Vec<i64>,
    /// Attention mask, 1 for real tokens, 0 for padding
    pub attention_mask: Vec<i64>,
}

/// Tokenizer wrapper producing fixed-length CLIP text inputs
pub struct ClipTokenizer {
    inner: HfTokenizer,
    max_tokens: usize,
}

impl fmt::Debug for ClipTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipTokenizer")
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl ClipTokenizer {
    /// Load a tokenizer from a JSON file and configure fixed padding
    /// and truncation to `max_tokens`
    pub fn from_file(path: impl AsRef<Path>, max_tokens: usize) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading tokenizer from {:?}", path);

        let mut inner = HfTokenizer::from_file(path)
            .map_err(|e| Error::Embedding(format!("Failed to load tokenizer: {}", e)))?;

        let pad_token = inner
            .get_padding()
            .map(|p| p.pad_token.clone())
            .unwrap_or_else(|| "[PAD]".to_string());
        let pad_id = inner.token_to_id(&pad_token).unwrap_or(0);

        inner.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_tokens),
            direction: PaddingDirection::Right,
            pad_to_multiple_of: None,
            pad_id,
            pad_type_id: 0,
            pad_token,
        }));

        inner
            .with_truncation(Some(TruncationParams {
                max_length: max_tokens,
                strategy: TruncationStrategy::LongestFirst,
                stride: 0,
                direction: TruncationDirection::Right,
            }))
            .map_err(|e| Error::Embedding(format!("Failed to configure truncation: {}", e)))?;

        Ok(Self { inner, max_tokens })
    }

    /// Get the fixed sequence length
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Tokenize a single text into fixed-length encoder inputs
    pub fn encode(&self, text: &str) -> Result<TokenizedText> {
        let encoding = self
            .inner
            .encode(text, true)
            .map_err(|e| Error::Embedding(format!("Tokenization failed: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        Ok(TokenizedText {
            input_ids,
            attention_mask,
        })
    }
}
