use crate::engines::generation::Phenotype;
use crate::types::{Artifact, Universe};
use chrono::NaiveDate;

/// Result of one full fitness computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Risk-adjusted return of the trained model; higher is better.
    pub score: f64,
    pub artifact: Artifact,
}

impl Evaluation {
    pub fn new(score: f64, artifact: impl Into<Artifact>) -> Self {
        Self {
            score,
            artifact: artifact.into(),
        }
    }
}

/// Trains and scores a model for a phenotype.
///
/// Implementations are expected to be deterministic for a given universe,
/// date and phenotype, and may take minutes to run. Errors are surfaced to
/// the caller unchanged.
pub trait FitnessEvaluator: Send + Sync {
    fn evaluate(
        &self,
        universe: &Universe,
        as_of: NaiveDate,
        phenotype: &Phenotype,
    ) -> anyhow::Result<Evaluation>;
}

impl<F> FitnessEvaluator for F
where
    F: Fn(&Universe, NaiveDate, &Phenotype) -> anyhow::Result<Evaluation> + Send + Sync,
{
    fn evaluate(
        &self,
        universe: &Universe,
        as_of: NaiveDate,
        phenotype: &Phenotype,
    ) -> anyhow::Result<Evaluation> {
        self(universe, as_of, phenotype)
    }
}
