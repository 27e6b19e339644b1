//! Embedding capability: `text → fixed-dimension vector`.
//!
//! Ingestion and retrieval only depend on the trait, so a real semantic
//! embedding provider can replace the placeholder without touching the
//! scoring logic.

pub mod hash;

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("embedding failed: {0}")]
    Failed(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Trait for text embedding implementations.
///
/// Implementations must be `Send + Sync` so they can serve concurrent
/// requests behind an `Arc`.
pub trait Embedder: Send + Sync {
    /// Embed a single text string into a vector of `dimensions()` floats.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;

    /// Return the dimensionality of the embedding vectors.
    fn dimensions(&self) -> usize;
}
