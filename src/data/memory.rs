use super::collection::Collection;
use super::document::{Document, DocumentId, Filter, Query};
use super::sampling::{RandomSource, ThreadRandom};
use super::store::{DocumentStore, StoreError, StoreResult};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Ephemeral store living in process memory.
pub struct MemoryStore {
    collection: RwLock<Collection>,
    random: Arc<dyn RandomSource>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_random(Arc::new(ThreadRandom))
    }

    pub fn with_random(random: Arc<dyn RandomSource>) -> Self {
        Self {
            collection: RwLock::new(Collection::new()),
            random,
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collection>> {
        self.collection.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Collection>> {
        self.collection.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, document: Document) -> StoreResult<DocumentId> {
        Ok(self.write()?.insert(document))
    }

    fn find_by_id(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn update_by_id(&self, id: &DocumentId, fields: Document) -> StoreResult<()> {
        self.write()?.update(id, fields)
    }

    fn delete_by_id(&self, id: &DocumentId) -> StoreResult<bool> {
        Ok(self.write()?.remove(id))
    }

    fn random_sample(&self, n: usize) -> StoreResult<Vec<Document>> {
        Ok(self.read()?.sample(n, self.random.as_ref()))
    }

    fn find_sorted(&self, query: &Query) -> StoreResult<Vec<Document>> {
        Ok(self.read()?.find(query))
    }

    fn count(&self, filter: &Filter) -> StoreResult<usize> {
        Ok(self.read()?.count(filter))
    }
}
