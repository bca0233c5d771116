use crate::data::{DocumentId, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradevolveError {
    #[error("No organism with id {0} in the population")]
    NotFound(DocumentId),

    #[error("Organism {0} is dead, the handle can no longer be used")]
    StaleHandle(DocumentId),

    #[error("Population is empty")]
    EmptyPopulation,

    #[error("Insufficient population: need {required} other organisms, found {available}")]
    InsufficientPopulation { required: usize, available: usize },

    #[error("Fitness evaluation failed: {0}")]
    Evaluation(anyhow::Error),

    #[error("Fitness evaluator returned a non-finite score: {0}")]
    InvalidFitness(f64),

    #[error("Gene {gene} has non-finite value {value}")]
    InvalidGene { gene: String, value: f64 },

    #[error("Organism {0} cannot kill itself")]
    SelfKill(DocumentId),

    #[error("Win recorded for {winner}, but {loser} was not removed: {source}")]
    KillIncomplete {
        winner: DocumentId,
        loser: DocumentId,
        #[source]
        source: Box<TradevolveError>,
    },

    #[error("Corrupt organism document {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, TradevolveError>;
