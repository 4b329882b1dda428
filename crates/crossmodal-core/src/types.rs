//! Shared types used across crossmodal crates

use serde::{Deserialize, Serialize};

/// Fixed-length embedding vector in the shared text/image space
pub type Embedding = Vec<f32>;

/// Which modalities a catalog item was embedded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Only a text embedding is present
    Text,
    /// Only an image embedding is present
    Image,
    /// Both text and image embeddings are present
    Both,
}

impl Modality {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Both => "both",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-supplied catalog entry
///
/// At least one of `text` and `image` must be present for the item to be
/// embeddable; an item with neither is rejected at catalog load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogItem {
    /// Free-form text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image locator: a filesystem path or an http(s) URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CatalogItem {
    /// Create an empty catalog item
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the image reference
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Whether the item carries at least one embeddable field
    pub fn is_embeddable(&self) -> bool {
        self.text.is_some() || self.image.is_some()
    }
}

/// A catalog item with its computed embeddings
///
/// Constructed once per item at catalog embedding time and immutable
/// afterwards. The `modality` tag always agrees with which embeddings are
/// present; the fields are private so the invariant cannot be broken
/// after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedItem {
    text_embedding: Option<Embedding>,
    image_embedding: Option<Embedding>,
    modality: Modality,
}

impl EmbeddedItem {
    /// Build an embedded item from the computed per-modality embeddings
    ///
    /// Returns `None` when neither embedding is present, in which case the
    /// caller reports the item as invalid.
    pub fn from_parts(
        text_embedding: Option<Embedding>,
        image_embedding: Option<Embedding>,
    ) -> Option<Self> {
        let modality = match (&text_embedding, &image_embedding) {
            (Some(_), Some(_)) => Modality::Both,
            (Some(_), None) => Modality::Text,
            (None, Some(_)) => Modality::Image,
            (None, None) => return None,
        };

        Some(Self {
            text_embedding,
            image_embedding,
            modality,
        })
    }

    /// The modality tag for this item
    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// The text embedding, if one was computed
    pub fn text_embedding(&self) -> Option<&[f32]> {
        self.text_embedding.as_deref()
    }

    /// The image embedding, if one was computed
    pub fn image_embedding(&self) -> Option<&[f32]> {
        self.image_embedding.as_deref()
    }
}

/// A scored catalog entry produced by the ranker
///
/// `index` refers to the position in the original catalog; `score` is a
/// cosine similarity in [-1.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Position of the item in the original catalog
    pub index: usize,
    /// Best-of cosine similarity against the query
    pub score: f32,
}

/// A fully assembled result record, ready for rendering or serialization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    /// 1-based rank position
    pub rank: usize,
    /// Position of the item in the original catalog
    pub item_index: usize,
    /// Similarity expressed as a percentage, rounded to two decimals
    pub similarity_percent: f64,
    /// Snapshot of the original catalog item
    pub item: CatalogItem,
}
