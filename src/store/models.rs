use serde::{Deserialize, Serialize};

/// A single crawled passage with its provenance and embedding.
///
/// Built during ingestion, then immutable: the store never mutates a
/// document after the snapshot is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Sequential identifier (`doc_<index>`), stable within one snapshot.
    /// The index follows crawl order, so IDs are not stable across re-ingestions.
    pub id: String,
    /// Normalized text (whitespace-collapsed, trimmed, non-empty).
    pub content: String,
    /// Originating URL. Provenance only; never used in scoring.
    pub source: String,
    /// Fixed-dimension embedding. All vectors in a store share one dimension.
    pub vector: Vec<f32>,
}
