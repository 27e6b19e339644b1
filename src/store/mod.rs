//! In-memory document store: an immutable snapshot of the crawled corpus.
//!
//! The store is built once at startup (from the cache or from a fresh
//! ingestion run) and then only read. Concurrent requests share it behind
//! an `Arc` with no locking.

pub mod models;
pub mod search;

pub use models::Document;

/// An ordered, read-only collection of documents.
pub struct Store {
    docs: Vec<Document>,
}

impl Store {
    /// Install a completed snapshot. The store takes ownership and never
    /// adds, removes, or mutates documents afterwards.
    #[must_use]
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// All documents in store order.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> Document {
        Document {
            id: id.to_string(),
            content: "some content".to_string(),
            source: "https://example.com".to_string(),
            vector: vec![0.0; 4],
        }
    }

    #[test]
    fn test_store_preserves_order() {
        let store = Store::new(vec![doc("doc_0"), doc("doc_1"), doc("doc_2")]);
        assert_eq!(store.len(), 3);
        assert!(!store.is_empty());
        let ids: Vec<&str> = store.documents().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["doc_0", "doc_1", "doc_2"]);
    }

    #[test]
    fn test_empty_store() {
        let store = Store::new(Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }
}
