//! Deterministic hash-derived embeddings.
//!
//! A placeholder standing in for a real semantic embedding provider: the
//! vector is derived from a polynomial character hash, so equal texts always
//! embed identically. Retrieval weights account for the low fidelity of this
//! signal.

use super::{Embedder, EmbedderError};

/// Embedder that derives a fixed-dimension vector from a text hash.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dimensions: 384 }
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let hash = text_hash(text);

        // Element i is ((hash + 7i) mod 1000) / 1000 - 0.5, spreading the
        // hash across the vector in [-0.5, 0.5).
        let mut embedding = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let v = (hash.wrapping_add(i as i64 * 7)).rem_euclid(1000);
            embedding.push(v as f32 / 1000.0 - 0.5);
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Polynomial (base 31) hash over the text's characters.
fn text_hash(text: &str) -> i64 {
    let mut hash: i64 = 0;
    for c in text.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(c as i64);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_dimensions() {
        let embedder = HashEmbedder::new(384);
        let result = embedder.embed("hello world").unwrap();
        assert_eq!(result.len(), 384);
        assert_eq!(embedder.dimensions(), 384);
    }

    #[test]
    fn test_embed_deterministic() {
        let embedder = HashEmbedder::new(384);
        let a = embedder.embed("hello").unwrap();
        let b = embedder.embed("hello").unwrap();
        assert_eq!(a, b, "same input should produce same output");
    }

    #[test]
    fn test_embed_different_inputs() {
        let embedder = HashEmbedder::new(384);
        let a = embedder.embed("hello").unwrap();
        let b = embedder.embed("world").unwrap();
        assert_ne!(a, b, "different inputs should produce different outputs");
    }

    #[test]
    fn test_embed_values_in_range() {
        let embedder = HashEmbedder::new(128);
        let vec = embedder.embed("range check").unwrap();
        for v in vec {
            assert!((-0.5..0.5).contains(&v), "value out of range: {v}");
        }
    }

    #[test]
    fn test_embed_empty_text() {
        let embedder = HashEmbedder::default();
        let vec = embedder.embed("").unwrap();
        assert_eq!(vec.len(), 384);
    }

    #[test]
    fn test_default_dimensions() {
        let embedder = HashEmbedder::default();
        assert_eq!(embedder.dimensions(), 384);
    }
}
