//! Crossmodal Embeddings - text and image embedding providers
//!
//! This crate turns text strings and image references into fixed-length
//! vectors in a shared embedding space, using ONNX exports of CLIP
//! ViT-B/32. The text and vision encoders are independent sessions but
//! produce directly comparable 512-dimensional vectors, which is what
//! makes cross-modal cosine ranking meaningful.
//!
//! The search pipeline depends only on the [`TextEmbedder`] and
//! [`ImageEmbedder`] traits, so tests (and alternative backends) can swap
//! the ONNX machinery out entirely.

pub mod lazy;
pub mod model;
pub mod provider;
pub mod similarity;
pub mod text;
pub mod tokenizer;
pub mod vision;

pub use lazy::{LazyClipText, LazyClipVision};
pub use model::{ClipModelConfig, ModelManager, EMBEDDING_DIM, INPUT_RESOLUTION, MAX_TOKENS};
pub use provider::{ImageEmbedder, TextEmbedder};
pub use similarity::{cosine_similarity, l2_normalize};
pub use text::ClipTextEncoder;
pub use tokenizer::{ClipTokenizer, TokenizedText};
pub use vision::ClipVisionEncoder;
