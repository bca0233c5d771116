#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tradevolve::data::{
    Document, DocumentId, DocumentStore, Filter, MemoryStore, Query, SeededRandom, StoreError,
    StoreResult,
};
use tradevolve::engines::evaluation::{Evaluation, FitnessEvaluator};
use tradevolve::engines::generation::Phenotype;
use tradevolve::types::Universe;
use tradevolve::Population;

/// Returns a fixed score and counts how often it ran.
pub struct CountingEvaluator {
    pub score: f64,
    calls: AtomicUsize,
}

impl CountingEvaluator {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FitnessEvaluator for CountingEvaluator {
    fn evaluate(
        &self,
        _universe: &Universe,
        _as_of: NaiveDate,
        _phenotype: &Phenotype,
    ) -> anyhow::Result<Evaluation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Evaluation::new(self.score, vec![7, 7, 7]))
    }
}

pub struct FailingEvaluator;

impl FitnessEvaluator for FailingEvaluator {
    fn evaluate(
        &self,
        _universe: &Universe,
        _as_of: NaiveDate,
        _phenotype: &Phenotype,
    ) -> anyhow::Result<Evaluation> {
        anyhow::bail!("training diverged")
    }
}

/// Memory store whose deletions can be switched to fail.
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_deletes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_deletes: AtomicBool::new(false),
        }
    }
}

impl DocumentStore for FlakyStore {
    fn insert(&self, document: Document) -> StoreResult<DocumentId> {
        self.inner.insert(document)
    }

    fn find_by_id(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        self.inner.find_by_id(id)
    }

    fn update_by_id(&self, id: &DocumentId, fields: Document) -> StoreResult<()> {
        self.inner.update_by_id(id, fields)
    }

    fn delete_by_id(&self, id: &DocumentId) -> StoreResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        self.inner.delete_by_id(id)
    }

    fn random_sample(&self, n: usize) -> StoreResult<Vec<Document>> {
        self.inner.random_sample(n)
    }

    fn find_sorted(&self, query: &Query) -> StoreResult<Vec<Document>> {
        self.inner.find_sorted(query)
    }

    fn count(&self, filter: &Filter) -> StoreResult<usize> {
        self.inner.count(filter)
    }
}

pub fn memory_population() -> Population {
    Population::new(Arc::new(MemoryStore::with_random(Arc::new(SeededRandom::new(42)))))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
