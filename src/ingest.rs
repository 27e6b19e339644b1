//! Ingestion pipeline: raw crawler output → validated document snapshot.
//!
//! Filters and normalizes passages, requests embeddings with a fixed
//! inter-call delay (the provider rate limit applies even when only
//! rebuilding the cache), and assigns identifiers that stay traceable to
//! crawl order. A single failed embedding never aborts the batch.

use std::time::Duration;

use tracing::{info, warn};

use crate::embedder::Embedder;
use crate::store::Document;

/// One `(content, source-url)` pair as produced by the crawler.
#[derive(Debug, Clone)]
pub struct RawPassage {
    pub content: String,
    pub source: String,
}

/// Build a document snapshot from raw passages.
///
/// Passages shorter than `min_content_len` after normalization are dropped.
/// The document index counts over all raw passages seen, including skipped
/// ones, so `doc_<n>` always points back at raw item `n`.
pub async fn build_snapshot(
    raw: Vec<RawPassage>,
    embedder: &dyn Embedder,
    min_content_len: usize,
    embed_delay: Duration,
) -> Vec<Document> {
    let total = raw.len();
    let mut documents = Vec::new();
    let mut embedded = 0usize;

    for (index, passage) in raw.into_iter().enumerate() {
        let content = normalize(&passage.content);
        if content.len() < min_content_len {
            continue;
        }

        let vector = match embedder.embed(&content) {
            Ok(v) => v,
            Err(e) => {
                warn!("Embedding failed for item {index}: {e}");
                continue;
            }
        };

        documents.push(Document {
            id: format!("doc_{index}"),
            content,
            source: passage.source,
            vector,
        });

        embedded += 1;
        if embedded % 10 == 0 {
            info!("Embedded {embedded}/{total} passages");
        }

        tokio::time::sleep(embed_delay).await;
    }

    info!("Ingestion produced {} documents from {total} raw passages", documents.len());
    documents
}

/// Trim and collapse all whitespace runs to single spaces.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::EmbedderError;
    use crate::embedder::hash::HashEmbedder;

    /// Embedder that rejects any text containing a marker string.
    struct FlakyEmbedder {
        inner: HashEmbedder,
    }

    impl Embedder for FlakyEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
            if text.contains("poison") {
                return Err(EmbedderError::Failed("simulated provider error".into()));
            }
            self.inner.embed(text)
        }

        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }
    }

    fn passage(content: &str) -> RawPassage {
        RawPassage {
            content: content.to_string(),
            source: "https://example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_short_passages_dropped() {
        let embedder = HashEmbedder::new(8);
        let raw = vec![
            passage("exactly nineteen ch"),      // 19 chars: dropped
            passage("twenty-one characters"),    // 21 chars: kept
        ];
        let docs = build_snapshot(raw, &embedder, 20, Duration::ZERO).await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "twenty-one characters");
    }

    #[tokio::test]
    async fn test_ids_track_raw_indices() {
        let embedder = HashEmbedder::new(8);
        let raw = vec![
            passage("short"),
            passage("a passage long enough to keep around"),
            passage("another passage long enough to keep"),
        ];
        let docs = build_snapshot(raw, &embedder, 20, Duration::ZERO).await;
        // Index 0 was skipped but still consumed an ID slot.
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["doc_1", "doc_2"]);
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_item_only() {
        let embedder = FlakyEmbedder {
            inner: HashEmbedder::new(8),
        };
        let raw = vec![
            passage("a perfectly fine passage of text"),
            passage("this one contains poison and will fail"),
            passage("and a final passage that works fine"),
        ];
        let docs = build_snapshot(raw, &embedder, 20, Duration::ZERO).await;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "doc_0");
        assert_eq!(docs[1].id, "doc_2");
    }

    #[tokio::test]
    async fn test_whitespace_normalized_before_filter() {
        let embedder = HashEmbedder::new(8);
        // Lots of whitespace around very little signal.
        let raw = vec![passage("   tiny\n\n\t text   ")];
        let docs = build_snapshot(raw, &embedder, 20, Duration::ZERO).await;
        assert!(docs.is_empty(), "normalized length is 9, below the threshold");
    }

    #[tokio::test]
    async fn test_vectors_have_embedder_dimension() {
        let embedder = HashEmbedder::new(16);
        let raw = vec![passage("a passage long enough to keep around")];
        let docs = build_snapshot(raw, &embedder, 20, Duration::ZERO).await;
        assert_eq!(docs[0].vector.len(), 16);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  a\t b\n\nc  "), "a b c");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("plain"), "plain");
    }
}
