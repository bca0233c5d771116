//! JSON file store.
//!
//! Each collection is one JSON file under the store directory. The whole file
//! is loaded on open and rewritten after every mutation through a temporary
//! file and a rename, so readers of the file never observe a half-written
//! collection. A mutation only becomes visible in memory once it is on disk.

use super::collection::Collection;
use super::document::{Document, DocumentId, Filter, Query};
use super::sampling::{RandomSource, ThreadRandom};
use super::store::{DocumentStore, StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Serialize, Deserialize)]
struct CollectionFile {
    collection: String,
    documents: Vec<Document>,
}

/// File-backed document store.
pub struct JsonFileStore {
    name: String,
    path: PathBuf,
    collection: Mutex<Collection>,
    random: Arc<dyn RandomSource>,
}

impl JsonFileStore {
    /// Opens (or creates) collection `name` inside `root`.
    pub fn open(root: impl AsRef<Path>, name: &str) -> StoreResult<Self> {
        Self::open_with_random(root, name, Arc::new(ThreadRandom))
    }

    pub fn open_with_random(
        root: impl AsRef<Path>,
        name: &str,
        random: Arc<dyn RandomSource>,
    ) -> StoreResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let path = root.join(format!("{}.json", name));

        let collection = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let file: CollectionFile = serde_json::from_str(&contents)?;
            if file.collection != name {
                return Err(StoreError::Backend(format!(
                    "{} holds collection '{}', expected '{}'",
                    path.display(),
                    file.collection,
                    name
                )));
            }
            Collection::from_documents(file.documents)?
        } else {
            Collection::new()
        };

        log::info!(
            "Opened collection '{}' at {} ({} documents)",
            name,
            path.display(),
            collection.len()
        );

        Ok(Self {
            name: name.to_string(),
            path,
            collection: Mutex::new(collection),
            random,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Collection>> {
        self.collection.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Applies `change` to a copy of the collection, persists the copy and
    /// only then swaps it in.
    fn mutate<T>(&self, change: impl FnOnce(&mut Collection) -> StoreResult<T>) -> StoreResult<T> {
        let mut current = self.lock()?;
        let mut next = current.clone();
        let result = change(&mut next)?;
        self.persist(&next)?;
        *current = next;
        Ok(result)
    }

    fn persist(&self, collection: &Collection) -> StoreResult<()> {
        let file = CollectionFile {
            collection: self.name.clone(),
            documents: collection.documents().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes())?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Flushed {} documents to {}", collection.len(), self.path.display());
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn insert(&self, document: Document) -> StoreResult<DocumentId> {
        self.mutate(|collection| Ok(collection.insert(document)))
    }

    fn find_by_id(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn update_by_id(&self, id: &DocumentId, fields: Document) -> StoreResult<()> {
        self.mutate(|collection| collection.update(id, fields))
    }

    fn delete_by_id(&self, id: &DocumentId) -> StoreResult<bool> {
        // Nothing to write when the document is already gone.
        if self.lock()?.get(id).is_none() {
            return Ok(false);
        }
        self.mutate(|collection| Ok(collection.remove(id)))
    }

    fn random_sample(&self, n: usize) -> StoreResult<Vec<Document>> {
        Ok(self.lock()?.sample(n, self.random.as_ref()))
    }

    fn find_sorted(&self, query: &Query) -> StoreResult<Vec<Document>> {
        Ok(self.lock()?.find(query))
    }

    fn count(&self, filter: &Filter) -> StoreResult<usize> {
        Ok(self.lock()?.count(filter))
    }
}
