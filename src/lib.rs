//! Steady-state evolution of trading-model hyperparameters.
//!
//! Organisms pair a [`Genotype`](engines::generation::Genotype) with cached
//! fitness and a win count, and live as documents in a
//! [`DocumentStore`](data::DocumentStore). The driving loop picks random
//! organisms from a [`Population`], lets them compete on fitness, kills the
//! losers and breeds winners by differential mutation.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod population;
pub mod types;

pub use error::{Result, TradevolveError};
pub use population::{Organism, Population, PopulationStats};
