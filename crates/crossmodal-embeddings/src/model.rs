//! Model loading, download, and configuration

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crossmodal_core::{Error, Result};

/// Model file information
const MODEL_NAME: &str = "clip-ViT-B-32";
const TEXT_MODEL_FILENAME: &str = "text_model.onnx";
const VISION_MODEL_FILENAME: &str = "vision_model.onnx";
const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Hugging Face URLs for the ONNX CLIP exports
const TEXT_MODEL_URL: &str =
    "https://huggingface.co/Qdrant/clip-ViT-B-32-text/resolve/main/model.onnx";
const VISION_MODEL_URL: &str =
    "https://huggingface.co/Qdrant/clip-ViT-B-32-vision/resolve/main/model.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/Qdrant/clip-ViT-B-32-text/resolve/main/tokenizer.json";

/// Embedding dimension shared by both CLIP ViT-B/32 encoders
pub const EMBEDDING_DIM: usize = 512;

/// Square input resolution expected by the vision encoder
pub const INPUT_RESOLUTION: u32 = 224;

/// Fixed token sequence length for the text encoder
pub const MAX_TOKENS: usize = 77;

/// Embedding model configuration
#[derive(Debug, Clone)]
pub struct ClipModelConfig {
    /// Path to the text encoder ONNX file
    pub text_model_path: PathBuf,
    /// Path to the vision encoder ONNX file
    pub vision_model_path: PathBuf,
    /// Path to the tokenizer JSON file
    pub tokenizer_path: PathBuf,
    /// Embedding dimension (512 for CLIP ViT-B/32)
    pub embedding_dim: usize,
    /// Vision input resolution
    pub input_resolution: u32,
    /// Fixed token sequence length
    pub max_tokens: usize,
}

impl Default for ClipModelConfig {
    fn default() -> Self {
        Self {
            text_model_path: PathBuf::new(),
            vision_model_path: PathBuf::new(),
            tokenizer_path: PathBuf::new(),
            embedding_dim: EMBEDDING_DIM,
            input_resolution: INPUT_RESOLUTION,
            max_tokens: MAX_TOKENS,
        }
    }
}

impl ClipModelConfig {
    /// Build a config pointing at model files inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            text_model_path: dir.join(TEXT_MODEL_FILENAME),
            vision_model_path: dir.join(VISION_MODEL_FILENAME),
            tokenizer_path: dir.join(TOKENIZER_FILENAME),
            ..Default::default()
        }
    }

    /// Check if all model files exist
    pub fn files_exist(&self) -> bool {
        self.text_model_path.exists()
            && self.vision_model_path.exists()
            && self.tokenizer_path.exists()
    }
}

/// Manages model downloading and storage
pub struct ModelManager {
    /// Base directory for model storage
    base_dir: PathBuf,
}

impl ModelManager {
    /// Create a new model manager with the default storage location
    pub fn new() -> Result<Self> {
        let base_dir = Self::default_model_dir()?;
        Ok(Self { base_dir })
    }

    /// Create a model manager with a custom base directory
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Get the default model directory (platform data dir + crossmodal/models)
    pub fn default_model_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| Error::Config("Could not determine local data directory".into()))?;
        Ok(data_dir.join("crossmodal").join("models"))
    }

    /// Get the model directory for the CLIP model
    pub fn model_dir(&self) -> PathBuf {
        self.base_dir.join(MODEL_NAME)
    }

    /// Build the model configuration for the managed files
    pub fn config(&self) -> ClipModelConfig {
        ClipModelConfig::in_dir(self.model_dir())
    }

    /// Check if all model files are available locally
    pub fn is_available(&self) -> bool {
        self.config().files_exist()
    }

    /// Ensure all model files are available, downloading any that are missing
    pub fn ensure_models_available(&self) -> Result<ClipModelConfig> {
        let config = self.config();

        if let Some(parent) = config.text_model_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::FileSystem(format!("Failed to create model directory: {}", e))
            })?;
        }

        let downloads = [
            (&config.text_model_path, TEXT_MODEL_URL, "text encoder"),
            (&config.vision_model_path, VISION_MODEL_URL, "vision encoder"),
            (&config.tokenizer_path, TOKENIZER_URL, "tokenizer"),
        ];

        for (path, url, what) in downloads {
            if path.exists() {
                debug!("{} already exists at {:?}", what, path);
                continue;
            }
            info!("Downloading {} from Hugging Face...", what);
            self.download_file(url, path)?;
            let digest = Self::sha256_digest(path)?;
            info!("{} downloaded (sha256 {})", what, digest);
        }

        Ok(config)
    }

    /// Download a file from URL to the specified path
    fn download_file(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("Downloading {} to {:?}", url, dest);

        let response = ureq::get(url)
            .call()
            .map_err(|e| Error::Embedding(format!("Failed to download model file: {}", e)))?;

        let content_length = response
            .header("Content-Length")
            .and_then(|s| s.parse::<u64>().ok());

        if let Some(len) = content_length {
            info!("Downloading {} bytes...", len);
        }

        // Write to a temporary file first, then rename for atomicity
        let temp_path = dest.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| Error::FileSystem(format!("Failed to create temporary file: {}", e)))?;

        let mut reader = response.into_reader();
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| Error::Embedding(format!("Failed to read download data: {}", e)))?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .map_err(|e| Error::FileSystem(format!("Failed to write model file: {}", e)))?;
        }

        file.sync_all()
            .map_err(|e| Error::FileSystem(format!("Failed to flush model file: {}", e)))?;
        drop(file);

        fs::rename(&temp_path, dest)
            .map_err(|e| Error::FileSystem(format!("Failed to move model file in place: {}", e)))?;

        Ok(())
    }

    /// Compute the SHA-256 digest of a file, hex-encoded
    pub fn sha256_digest(path: &Path) -> Result<String> {
        let mut file = fs::File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = file.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        let digest = hasher.finalize();
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }
}
