//! Text embedding via the ONNX CLIP text encoder

use parking_lot::Mutex;

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tracing::debug;

use crossmodal_core::{Embedding, Error, Result};

use crate::model::ClipModelConfig;
use crate::provider::TextEmbedder;
use crate::similarity::l2_normalize;
use crate::tokenizer::ClipTokenizer;

/// CLIP text encoder backed by an ONNX Runtime session
///
/// Produces L2-normalized vectors in the same space as
/// [`ClipVisionEncoder`](crate::vision::ClipVisionEncoder).
pub struct ClipTextEncoder {
    session: Mutex<Session>,
    tokenizer: ClipTokenizer,
    config: ClipModelConfig,
}

impl ClipTextEncoder {
    /// Load the text encoder and its tokenizer from the configured paths
    pub fn new(config: ClipModelConfig) -> Result<Self> {
        debug!("Loading CLIP text encoder from {:?}", config.text_model_path);

        let session = Session::builder()
            .map_err(|e| Error::Embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::Embedding(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::Embedding(format!("Failed to set thread count: {}", e)))?
            .commit_from_file(&config.text_model_path)
            .map_err(|e| Error::Embedding(format!("Failed to load text model: {}", e)))?;

        let tokenizer = ClipTokenizer::from_file(&config.tokenizer_path, config.max_tokens)?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            config,
        })
    }

    fn embed_internal(&self, text: &str) -> Result<Embedding> {
        let encoded = self.tokenizer.encode(text)?;
        let seq_len = encoded.input_ids.len();
        let attention_mask = encoded.attention_mask.clone();

        let shape = [1usize, seq_len];
        let input_ids_tensor = Tensor::from_array((shape, encoded.input_ids))
            .map_err(|e| Error::Embedding(format!("Failed to create input_ids tensor: {}", e)))?;
        let mask_tensor = Tensor::from_array((shape, encoded.attention_mask)).map_err(|e| {
            Error::Embedding(format!("Failed to create attention_mask tensor: {}", e))
        })?;

        let mut session = self.session.lock();

        let ids_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| Error::Embedding("Text model has no inputs".into()))?;
        // Some exports take input_ids only; others also take an attention mask
        let mask_name = session.inputs.get(1).map(|i| i.name.clone());
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| Error::Embedding("Text model has no outputs".into()))?;

        let outputs = match mask_name {
            Some(mask_name) => session.run(ort::inputs![
                ids_name => input_ids_tensor,
                mask_name => mask_tensor
            ]),
            None => session.run(ort::inputs![ids_name => input_ids_tensor]),
        }
        .map_err(|e| Error::Embedding(format!("Text inference failed: {}", e)))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| Error::Embedding(format!("No output '{}' from text model", output_name)))?;

        let (out_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Embedding(format!("Failed to extract output tensor: {}", e)))?;

        // Pooled exports emit [1, dim]; token-level exports emit
        // [1, seq_len, hidden] and need attention-masked mean pooling
        let embedding = match out_shape.len() {
            2 => data.to_vec(),
            3 => {
                let hidden_dim = out_shape[2] as usize;
                mean_pool(data, &attention_mask, seq_len, hidden_dim)
            }
            n => {
                return Err(Error::Embedding(format!(
                    "Expected 2D or 3D output tensor, got {}D with shape {:?}",
                    n, out_shape
                )))
            }
        };

        let normalized = l2_normalize(&embedding);

        if normalized.len() != self.config.embedding_dim {
            return Err(Error::DimensionMismatch {
                expected: self.config.embedding_dim,
                actual: normalized.len(),
            });
        }

        Ok(normalized)
    }
}

impl TextEmbedder for ClipTextEncoder {
    fn embed_text(&self, text: &str) -> Result<Embedding> {
        self.embed_internal(text)
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }
}

/// Mean pooling over the sequence dimension, weighted by the attention mask
fn mean_pool(data: &[f32], attention_mask: &[i64], seq_len: usize, hidden_dim: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_dim];
    let mut count = 0.0f32;

    for (i, mask_val) in attention_mask.iter().enumerate().take(seq_len) {
        if *mask_val == 1 {
            let start = i * hidden_dim;
            let end = start + hidden_dim;
            if end <= data.len() {
                for (j, val) in sum.iter_mut().enumerate() {
                    *val += data[start + j];
                }
                count += 1.0;
            }
        }
    }

    if count > 0.0 {
        for val in &mut sum {
            *val /= count;
        }
    }

    sum
}
