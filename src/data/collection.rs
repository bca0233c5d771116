use super::document::{project, Document, DocumentId, Filter, Query, ID_FIELD};
use super::sampling::RandomSource;
use super::store::{StoreError, StoreResult};
use serde_json::Value;
use std::collections::BTreeMap;

/// In-memory set of documents keyed by id. Backends wrap it with their own
/// locking and persistence.
#[derive(Debug, Default, Clone)]
pub struct Collection {
    documents: BTreeMap<DocumentId, Document>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a collection from documents that already carry an `_id`.
    pub fn from_documents(documents: Vec<Document>) -> StoreResult<Self> {
        let mut collection = Self::new();
        for document in documents {
            let id = DocumentId::from_document(&document).ok_or_else(|| {
                StoreError::Backend(format!(
                    "document without a valid {}: {:?}",
                    ID_FIELD, document
                ))
            })?;
            collection.documents.insert(id, document);
        }
        Ok(collection)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn insert(&mut self, mut document: Document) -> DocumentId {
        let id = DocumentId::new();
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self.documents.insert(id, document);
        id
    }

    pub fn get(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn update(&mut self, id: &DocumentId, fields: Document) -> StoreResult<()> {
        let document = self.documents.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        for (key, value) in fields {
            if key != ID_FIELD {
                document.insert(key, value);
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &DocumentId) -> bool {
        self.documents.remove(id).is_some()
    }

    pub fn sample(&self, n: usize, random: &dyn RandomSource) -> Vec<Document> {
        let ids: Vec<&DocumentId> = self.documents.keys().collect();
        random
            .sample_indices(ids.len(), n)
            .into_iter()
            .filter_map(|i| ids.get(i).and_then(|id| self.documents.get(*id)))
            .map(|document| project(document, &[]))
            .collect()
    }

    pub fn find(&self, query: &Query) -> Vec<Document> {
        query.apply(self.documents.values())
    }

    pub fn count(&self, filter: &Filter) -> usize {
        self.documents.values().filter(|doc| filter.matches(doc)).count()
    }
}
