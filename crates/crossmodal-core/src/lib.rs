//! Crossmodal Core - Configuration, error types, and shared data model
//!
//! This crate provides the foundational types used across all crossmodal
//! crates: the catalog data model, the error taxonomy, and configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, EmbeddingSettings, ModelSettings, SearchSettings};
pub use error::{Error, Result};
pub use types::{CatalogItem, EmbeddedItem, Embedding, Match, Modality, RankedResult};
