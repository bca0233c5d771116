use super::manager::Population;
use super::record::OrganismRecord;
use crate::data::DocumentId;
use crate::engines::evaluation::FitnessEvaluator;
use crate::engines::generation::Genotype;
use crate::error::{Result, TradevolveError};
use crate::types::{FitnessRecord, Universe};
use chrono::NaiveDate;
use std::fmt;

/// Number of donors differential mutation draws from the population.
pub const DONORS: usize = 3;

/// Live handle on one stored organism.
///
/// Accessors read the state loaded into the handle. Operations that touch the
/// store fail with [`TradevolveError::StaleHandle`] once the organism has
/// died through this handle.
#[derive(Debug)]
pub struct Organism {
    population: Population,
    record: OrganismRecord,
    alive: bool,
}

impl Organism {
    pub(crate) fn from_record(population: Population, record: OrganismRecord) -> Self {
        Self {
            population,
            record,
            alive: true,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.record.id()
    }

    pub fn genotype(&self) -> &Genotype {
        self.record.genotype()
    }

    pub fn wins(&self) -> u32 {
        self.record.wins()
    }

    /// Last cached score, if the organism was ever evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.record.fitness().map(|record| record.score)
    }

    pub fn fitness_record(&self) -> Option<&FitnessRecord> {
        self.record.fitness()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Fitness for `universe` as of `as_of`.
    ///
    /// A cached record for the same universe and date is returned without
    /// calling the evaluator or writing to the store, as long as the organism
    /// is still stored. Otherwise the evaluator
    /// runs and its result replaces the cached record, in the store first and
    /// then in this handle. A failed evaluation leaves both untouched.
    pub fn evaluate_fitness<E>(
        &mut self,
        evaluator: &E,
        universe: &Universe,
        as_of: NaiveDate,
    ) -> Result<f64>
    where
        E: FitnessEvaluator + ?Sized,
    {
        self.ensure_alive()?;

        if let Some(cached) = self.record.fitness() {
            if cached.is_valid_for(universe, as_of) {
                let score = cached.score;
                self.ensure_stored()?;
                log::debug!("Organism {}: cached fitness {:.4}", self.id(), score);
                return Ok(score);
            }
        }

        log::info!(
            "Organism {}: evaluating fitness on {} tickers as of {}",
            self.id(),
            universe.len(),
            as_of
        );
        let phenotype = self.record.genotype().decode();
        let evaluation = evaluator
            .evaluate(universe, as_of, &phenotype)
            .map_err(TradevolveError::Evaluation)?;
        if !evaluation.score.is_finite() {
            return Err(TradevolveError::InvalidFitness(evaluation.score));
        }

        let score = evaluation.score;
        let record = FitnessRecord {
            score,
            date: as_of,
            universe: universe.clone(),
            artifact: evaluation.artifact,
        };
        self.commit(|organism| organism.set_fitness(record))?;
        log::info!("Organism {}: fitness {:.4}", self.id(), score);
        Ok(score)
    }

    /// Records a win, then removes `other` from the population.
    ///
    /// `other` must still be stored; a loser already removed through another
    /// handle fails with [`TradevolveError::NotFound`] and no win is recorded.
    /// The win is persisted before the deletion and is not rolled back if the
    /// deletion fails; that case surfaces as
    /// [`TradevolveError::KillIncomplete`] and `other` stays usable so the
    /// caller can retry [`Organism::die`].
    pub fn kill(&mut self, other: &mut Organism) -> Result<()> {
        self.ensure_alive()?;
        other.ensure_alive()?;
        if self.id() == other.id() {
            return Err(TradevolveError::SelfKill(self.id()));
        }
        other.ensure_stored()?;

        let wins = self.wins().saturating_add(1);
        self.commit(|organism| organism.set_wins(wins))?;
        log::info!("Organism {} killed {} ({} wins)", self.id(), other.id(), wins);

        other.die().map_err(|source| TradevolveError::KillIncomplete {
            winner: self.id(),
            loser: other.id(),
            source: Box::new(source),
        })
    }

    /// Removes the organism from the population.
    ///
    /// A document that is already gone counts as dead, so retrying after a
    /// failed attempt is safe.
    pub fn die(&mut self) -> Result<()> {
        self.ensure_alive()?;
        if self.population.store().delete_by_id(&self.id())? {
            log::info!("Organism {} died", self.id());
        } else {
            log::warn!("Organism {} was already removed from the population", self.id());
        }
        self.alive = false;
        Ok(())
    }

    /// Breeds a child from this organism and three other random organisms.
    ///
    /// Nothing is inserted unless three donors were found.
    pub fn make_child(&self) -> Result<Organism> {
        self.ensure_alive()?;

        let donors: Vec<Organism> = self
            .population
            .random_sample(DONORS + 1)?
            .into_iter()
            .filter(|donor| donor.id() != self.id())
            .take(DONORS)
            .collect();

        let [a, b, c] = donors.as_slice() else {
            return Err(TradevolveError::InsufficientPopulation {
                required: DONORS,
                available: donors.len(),
            });
        };

        let genotype = self.genotype().make_child(
            a.genotype(),
            b.genotype(),
            c.genotype(),
            self.population.mutation(),
        );
        let child = self.population.create(Some(genotype))?;
        log::info!(
            "Organism {} bred {} with donors {}, {}, {}",
            self.id(),
            child.id(),
            a.id(),
            b.id(),
            c.id()
        );
        Ok(child)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.alive {
            Ok(())
        } else {
            Err(TradevolveError::StaleHandle(self.id()))
        }
    }

    /// Fails with [`TradevolveError::NotFound`] when the document was removed
    /// through another handle.
    fn ensure_stored(&self) -> Result<()> {
        self.ensure_alive()?;
        match self.population.store().find_by_id(&self.id())? {
            Some(_) => Ok(()),
            None => Err(TradevolveError::NotFound(self.id())),
        }
    }

    /// Applies `change` to a copy of the record, flushes its dirty fields as
    /// one partial update and adopts the copy once the store accepted it.
    fn commit(&mut self, change: impl FnOnce(&mut OrganismRecord)) -> Result<()> {
        let mut next = self.record.clone();
        change(&mut next);

        let fields = next.changes()?;
        if !fields.is_empty() {
            self.population.update(&next.id(), fields)?;
        }
        next.mark_clean();
        self.record = next;
        Ok(())
    }
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.genotype().fmt(f)
    }
}
