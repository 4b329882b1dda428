//! Image embedding via the ONNX CLIP vision encoder

use std::io::Read;

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array4;
use parking_lot::Mutex;

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tracing::debug;

use crossmodal_core::{Embedding, Error, Result};

use crate::model::ClipModelConfig;
use crate::provider::ImageEmbedder;
use crate::similarity::l2_normalize;

/// Upper bound on fetched image size (32MB)
const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

/// CLIP vision encoder backed by an ONNX Runtime session
///
/// Resolves image references itself: `http://` and `https://` locators
/// are fetched over the network, anything else is read from the
/// filesystem. Produces L2-normalized vectors in the same space as
/// [`ClipTextEncoder`](crate::text::ClipTextEncoder).
pub struct ClipVisionEncoder {
    session: Mutex<Session>,
    config: ClipModelConfig,
}

impl ClipVisionEncoder {
    /// Load the vision encoder from the configured path
    pub fn new(config: ClipModelConfig) -> Result<Self> {
        debug!(
            "Loading CLIP vision encoder from {:?}",
            config.vision_model_path
        );

        let session = Session::builder()
            .map_err(|e| Error::Embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::Embedding(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(4)
            .map_err(|e| Error::Embedding(format!("Failed to set thread count: {}", e)))?
            .commit_from_file(&config.vision_model_path)
            .map_err(|e| Error::Embedding(format!("Failed to load vision model: {}", e)))?;

        Ok(Self {
            session: Mutex::new(session),
            config,
        })
    }

    /// Resolve an image reference into decoded pixels
    fn resolve_image(&self, image_ref: &str) -> Result<DynamicImage> {
        let bytes = if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
            debug!("Fetching image from {}", image_ref);
            let response = ureq::get(image_ref)
                .call()
                .map_err(|e| Error::Embedding(format!("Failed to fetch image: {}", e)))?;
            let mut bytes = Vec::new();
            response
                .into_reader()
                .take(MAX_IMAGE_BYTES)
                .read_to_end(&mut bytes)
                .map_err(|e| Error::Embedding(format!("Failed to read image data: {}", e)))?;
            bytes
        } else {
            std::fs::read(image_ref)
                .map_err(|e| Error::Embedding(format!("Failed to read image file: {}", e)))?
        };

        image::load_from_memory(&bytes)
            .map_err(|e| Error::Embedding(format!("Failed to decode image: {}", e)))
    }

    fn embed_internal(&self, image_ref: &str) -> Result<Embedding> {
        let image = self.resolve_image(image_ref)?;
        let pixel_values = preprocess_image(&image, self.config.input_resolution);

        let input_tensor = Tensor::from_array(pixel_values)
            .map_err(|e| Error::Embedding(format!("Failed to create input tensor: {}", e)))?;

        let mut session = self.session.lock();

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| Error::Embedding("Vision model has no inputs".into()))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| Error::Embedding("Vision model has no outputs".into()))?;

        let outputs = session
            .run(ort::inputs![input_name => input_tensor])
            .map_err(|e| Error::Embedding(format!("Vision inference failed: {}", e)))?;

        let output = outputs.get(&output_name).ok_or_else(|| {
            Error::Embedding(format!("No output '{}' from vision model", output_name))
        })?;

        let (out_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Embedding(format!("Failed to extract output tensor: {}", e)))?;

        // Pooled exports emit [1, dim]; token-level exports emit
        // [1, positions, hidden], in which case the class token leads
        let embedding = match out_shape.len() {
            2 => data.to_vec(),
            3 => {
                let hidden_dim = out_shape[2] as usize;
                data[..hidden_dim].to_vec()
            }
            n => {
                return Err(Error::Embedding(format!(
                    "Expected 2D or 3D output tensor, got {}D with shape {:?}",
                    n, out_shape
                )))
            }
        };

        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(Error::Embedding(
                "Vision model produced non-finite values".into(),
            ));
        }

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

impl ImageEmbedder for ClipVisionEncoder {
    fn embed_image(&self, image_ref: &str) -> Result<Embedding> {
        self.embed_internal(image_ref)
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }
}

/// Preprocess an image for CLIP inference
///
/// Resizes the shortest edge to `size` preserving aspect ratio, center
/// crops to `size` x `size`, and lays the pixels out as an NCHW f32
/// array scaled to [0, 1].
pub fn preprocess_image(image: &DynamicImage, size: u32) -> Array4<f32> {
    let (w, h) = image.dimensions();

    let scale = size as f32 / w.min(h) as f32;
    let new_w = ((w as f32) * scale).round().max(1.0) as u32;
    let new_h = ((h as f32) * scale).round().max(1.0) as u32;
    let resized = image.resize_exact(new_w, new_h, FilterType::Triangle);

    let start_x = (resized.width().saturating_sub(size)) / 2;
    let start_y = (resized.height().saturating_sub(size)) / 2;

    let mut array = Array4::<f32>::zeros((1, 3, size as usize, size as usize));

    for y in 0..size as usize {
        for x in 0..size as usize {
            let pixel = resized.get_pixel(start_x + x as u32, start_y + y as u32);
            array[[0, 0, y, x]] = pixel[0] as f32 / 255.0;
            array[[0, 1, y, x]] = pixel[1] as f32 / 255.0;
            array[[0, 2, y, x]] = pixel[2] as f32 / 255.0;
        }
    }

    array
}
