//! Document store contract.

use super::document::{Document, DocumentId, Filter, Query};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("{0}")]
    Backend(String),
}

/// A persistent collection of documents.
///
/// Every method is a single atomic operation on the backend, so handles on
/// different documents never need in-process coordination. Concurrent writes
/// to the same document are last-write-wins.
pub trait DocumentStore: Send + Sync {
    /// Stores a new document under a fresh identifier and returns it.
    fn insert(&self, document: Document) -> StoreResult<DocumentId>;

    fn find_by_id(&self, id: &DocumentId) -> StoreResult<Option<Document>>;

    /// Overwrites the given top-level fields. Fails with
    /// [`StoreError::NotFound`] if the document is absent.
    fn update_by_id(&self, id: &DocumentId, fields: Document) -> StoreResult<()>;

    /// Returns whether a document was actually removed.
    fn delete_by_id(&self, id: &DocumentId) -> StoreResult<bool>;

    /// Up to `n` distinct documents drawn uniformly, projected to `_id`.
    fn random_sample(&self, n: usize) -> StoreResult<Vec<Document>>;

    fn find_sorted(&self, query: &Query) -> StoreResult<Vec<Document>>;

    fn count(&self, filter: &Filter) -> StoreResult<usize>;
}
