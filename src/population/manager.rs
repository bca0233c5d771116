use super::organism::Organism;
use super::record::{OrganismRecord, SCORE, WINS};
use super::stats::PopulationStats;
use crate::config::{AppConfig, StoreBackend};
use crate::data::{
    Document, DocumentId, DocumentStore, Filter, JsonFileStore, MemoryStore, Query, RandomSource,
    SeededRandom, SortDirection, StoreError, ThreadRandom,
};
use crate::engines::generation::{DifferentialMutation, Genotype};
use crate::error::{Result, TradevolveError};
use std::fmt;
use std::sync::Arc;

/// Handle on the organism collection.
///
/// Cloning is cheap and every clone talks to the same store, so independent
/// threads can each hold their own `Population` and organisms.
#[derive(Clone)]
pub struct Population {
    store: Arc<dyn DocumentStore>,
    mutation: Arc<DifferentialMutation>,
}

impl Population {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_mutation(store, DifferentialMutation::default())
    }

    pub fn with_mutation(store: Arc<dyn DocumentStore>, mutation: DifferentialMutation) -> Self {
        Self {
            store,
            mutation: Arc::new(mutation),
        }
    }

    /// Builds the store described by `config`.
    pub fn open(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let random: Arc<dyn RandomSource> = match config.store.seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };
        let store: Arc<dyn DocumentStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::with_random(random)),
            StoreBackend::JsonFile => Arc::new(JsonFileStore::open_with_random(
                &config.store.path,
                &config.store.collection,
                random,
            )?),
        };

        Ok(Self::with_mutation(store, DifferentialMutation::from(&config.evolution)))
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn mutation(&self) -> &DifferentialMutation {
        &self.mutation
    }

    /// Inserts a new organism; without a genotype it gets the default one.
    pub fn create(&self, genotype: Option<Genotype>) -> Result<Organism> {
        let genotype = genotype.unwrap_or_default();
        let id = self.store.insert(OrganismRecord::insert_document(&genotype)?)?;
        log::debug!("Created organism {}", id);
        Ok(Organism::from_record(self.clone(), OrganismRecord::created(id, genotype)))
    }

    pub fn create_blank(&self) -> Result<Organism> {
        self.create(None)
    }

    pub fn load(&self, id: DocumentId) -> Result<Organism> {
        let document = self
            .store
            .find_by_id(&id)?
            .ok_or(TradevolveError::NotFound(id))?;
        let record = OrganismRecord::decode(&document)?;
        Ok(Organism::from_record(self.clone(), record))
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.store.count(&Filter::All)?)
    }

    /// Up to `n` distinct organisms chosen uniformly at random.
    ///
    /// Returns fewer than `n` when the population is smaller.
    pub fn random_sample(&self, n: usize) -> Result<Vec<Organism>> {
        self.store
            .random_sample(n)?
            .iter()
            .map(|document| self.load(document_id(document)?))
            .collect()
    }

    pub fn random_one(&self) -> Result<Organism> {
        self.random_sample(1)?
            .into_iter()
            .next()
            .ok_or(TradevolveError::EmptyPopulation)
    }

    /// Every organism, ascending by cached score, unscored ones first.
    ///
    /// Only identifiers are read up front; each organism is loaded when the
    /// iterator reaches it. An organism removed in the meantime yields
    /// [`TradevolveError::NotFound`].
    pub fn all_sorted_by_fitness(&self) -> Result<SortedOrganisms> {
        let query = Query::new()
            .project(Vec::<String>::new())
            .sort_by(SCORE, SortDirection::Ascending);
        let ids = self
            .store
            .find_sorted(&query)?
            .iter()
            .map(document_id)
            .collect::<Result<Vec<_>>>()?;

        Ok(SortedOrganisms {
            population: self.clone(),
            ids: ids.into_iter(),
        })
    }

    /// Lowest and highest cached score, and the most wins.
    pub fn stats(&self) -> Result<PopulationStats> {
        let min_score = self.extreme(SCORE, SortDirection::Ascending)?;
        let max_score = self.extreme(SCORE, SortDirection::Descending)?;
        let max_wins = self
            .extreme(WINS, SortDirection::Descending)?
            .map(|wins| wins as u32);

        Ok(PopulationStats {
            min_score,
            max_score,
            max_wins,
        })
    }

    fn extreme(&self, path: &str, direction: SortDirection) -> Result<Option<f64>> {
        let query = Query::new()
            .filter(Filter::exists(path))
            .project([path])
            .sort_by(path, direction)
            .limit(1);
        Ok(self
            .store
            .find_sorted(&query)?
            .first()
            .and_then(|document| crate::data::lookup(document, path))
            .and_then(|value| value.as_f64()))
    }

    /// Partial update of one organism; a missing document is reported as
    /// [`TradevolveError::NotFound`].
    pub(crate) fn update(&self, id: &DocumentId, fields: Document) -> Result<()> {
        self.store.update_by_id(id, fields).map_err(|e| match e {
            StoreError::NotFound(id) => TradevolveError::NotFound(id),
            other => other.into(),
        })
    }
}

impl fmt::Debug for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Population")
            .field("mutation", &self.mutation)
            .finish_non_exhaustive()
    }
}

fn document_id(document: &Document) -> Result<DocumentId> {
    DocumentId::from_document(document).ok_or_else(|| TradevolveError::Corrupt {
        id: format!("{:?}", document.get(crate::data::ID_FIELD)),
        reason: "missing or malformed identifier".to_string(),
    })
}

/// Lazy, single-pass walk over the population in fitness order.
pub struct SortedOrganisms {
    population: Population,
    ids: std::vec::IntoIter<DocumentId>,
}

impl Iterator for SortedOrganisms {
    type Item = Result<Organism>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|id| self.population.load(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl ExactSizeIterator for SortedOrganisms {}
