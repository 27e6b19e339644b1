//! On-disk corpus cache.
//!
//! Persists the document snapshot as a JSON record with a creation
//! timestamp. A record older than the freshness window is stale; stale,
//! missing, or unreadable records all resolve to a fresh ingestion run,
//! never to an error at startup.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::store::Document;

#[derive(Error, Debug)]
pub enum CacheError {
    /// The stored form could not be parsed into well-formed documents.
    /// Callers must treat this as a cache miss.
    #[error("cache record is corrupt: {0}")]
    Corrupt(String),

    /// Storage-layer failure while persisting. Non-fatal: the in-memory
    /// snapshot stays usable.
    #[error("cache write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// The persisted form: the full document collection plus its creation time.
#[derive(Serialize, Deserialize)]
struct CacheRecord {
    created_at: DateTime<Utc>,
    documents: Vec<Document>,
}

/// Manages the persisted snapshot at a fixed path.
pub struct CacheManager {
    path: PathBuf,
    freshness_window: Duration,
    dimensions: usize,
}

impl CacheManager {
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P, ttl_hours: u64, dimensions: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            freshness_window: Duration::hours(ttl_hours as i64),
            dimensions,
        }
    }

    /// True iff a record exists, parses, and is within the freshness window.
    ///
    /// Missing file, unreadable file, and expired timestamp are all `false`,
    /// never an error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let Ok(data) = std::fs::read_to_string(&self.path) else {
            return false;
        };
        let Ok(record) = serde_json::from_str::<CacheRecord>(&data) else {
            return false;
        };

        let age = Utc::now().signed_duration_since(record.created_at);
        age >= Duration::zero() && age <= self.freshness_window
    }

    /// Deserialize the record into a document snapshot.
    ///
    /// Fails with [`CacheError::Corrupt`] when the stored form cannot be
    /// parsed into well-formed documents (non-empty content, expected vector
    /// dimension). A load either fully succeeds or fails cleanly; there is
    /// no partial result.
    pub fn load(&self) -> Result<Vec<Document>, CacheError> {
        let data = std::fs::read_to_string(&self.path)
            .map_err(|e| CacheError::Corrupt(format!("unreadable record: {e}")))?;
        let record: CacheRecord =
            serde_json::from_str(&data).map_err(|e| CacheError::Corrupt(e.to_string()))?;

        for doc in &record.documents {
            if doc.content.is_empty() {
                return Err(CacheError::Corrupt(format!("document {} has empty content", doc.id)));
            }
            if doc.vector.len() != self.dimensions {
                return Err(CacheError::Corrupt(format!(
                    "document {} has vector dimension {} (expected {})",
                    doc.id,
                    doc.vector.len(),
                    self.dimensions
                )));
            }
        }

        info!("Loaded {} documents from cache", record.documents.len());
        Ok(record.documents)
    }

    /// Persist the snapshot with a fresh timestamp.
    ///
    /// Writes to a temporary file and renames it into place, so a concurrent
    /// `load` never observes a half-written record.
    pub fn save(&self, documents: &[Document]) -> Result<(), CacheError> {
        let record = CacheRecord {
            created_at: Utc::now(),
            documents: documents.to_vec(),
        };
        let data = serde_json::to_string(&record)
            .map_err(|e| CacheError::Write(std::io::Error::other(e)))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!("Saved {} documents to {}", documents.len(), self.path.display());
        Ok(())
    }

    /// Remove the persisted record. An already-loaded in-memory snapshot is
    /// unaffected. A missing record is success.
    pub fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared cache at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Write(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn doc(id: &str, dims: usize) -> Document {
        Document {
            id: id.to_string(),
            content: format!("content for {id}"),
            source: "https://example.com/page".to_string(),
            vector: vec![0.25; dims],
        }
    }

    fn manager(dir: &Path) -> CacheManager {
        CacheManager::new(dir.join("cache.json"), 24, 4)
    }

    #[test]
    fn test_roundtrip_preserves_documents() {
        let temp = tempdir().unwrap();
        let cache = manager(temp.path());

        let docs = vec![doc("doc_0", 4), doc("doc_3", 4)];
        cache.save(&docs).unwrap();
        let loaded = cache.load().unwrap();

        assert_eq!(loaded, docs);
    }

    #[test]
    fn test_is_valid_lifecycle() {
        let temp = tempdir().unwrap();
        let cache = manager(temp.path());

        assert!(!cache.is_valid(), "no record yet");
        cache.save(&[doc("doc_0", 4)]).unwrap();
        assert!(cache.is_valid(), "fresh record");
        cache.clear().unwrap();
        assert!(!cache.is_valid(), "cleared record");
    }

    #[test]
    fn test_clear_missing_record_is_ok() {
        let temp = tempdir().unwrap();
        let cache = manager(temp.path());
        assert!(cache.clear().is_ok());
    }

    #[test]
    fn test_expired_record_is_invalid() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("cache.json");
        let cache = CacheManager::new(&path, 1, 4);

        let record = CacheRecord {
            created_at: Utc::now() - Duration::hours(2),
            documents: vec![doc("doc_0", 4)],
        };
        std::fs::write(&path, serde_json::to_string(&record).unwrap()).unwrap();

        assert!(!cache.is_valid());
    }

    #[test]
    fn test_unparseable_record_is_invalid_and_corrupt() {
        let temp = tempdir().unwrap();
        let cache = manager(temp.path());
        std::fs::write(temp.path().join("cache.json"), "{garbage").unwrap();

        assert!(!cache.is_valid());
        assert!(matches!(cache.load(), Err(CacheError::Corrupt(_))));
    }

    #[test]
    fn test_wrong_dimension_is_corrupt() {
        let temp = tempdir().unwrap();
        let cache = manager(temp.path());

        // Written with dimension 4, read back expecting 8.
        cache.save(&[doc("doc_0", 4)]).unwrap();
        let strict = CacheManager::new(temp.path().join("cache.json"), 24, 8);
        assert!(matches!(strict.load(), Err(CacheError::Corrupt(_))));
    }

    #[test]
    fn test_empty_content_is_corrupt() {
        let temp = tempdir().unwrap();
        let cache = manager(temp.path());

        let mut bad = doc("doc_0", 4);
        bad.content = String::new();
        cache.save(&[bad]).unwrap();
        assert!(matches!(cache.load(), Err(CacheError::Corrupt(_))));
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let temp = tempdir().unwrap();
        let cache = CacheManager::new(temp.path().join("no/such/dir/cache.json"), 24, 4);
        assert!(matches!(cache.save(&[doc("doc_0", 4)]), Err(CacheError::Write(_))));
    }

    #[test]
    fn test_clear_leaves_in_memory_snapshot_alone() {
        let temp = tempdir().unwrap();
        let cache = manager(temp.path());

        let docs = vec![doc("doc_0", 4)];
        cache.save(&docs).unwrap();
        let loaded = cache.load().unwrap();
        cache.clear().unwrap();

        // The loaded snapshot is still intact after the record is gone.
        assert_eq!(loaded.len(), 1);
        assert!(!cache.is_valid());
    }
}
