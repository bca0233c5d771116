//! Persistent population of organisms.
//!
//! [`Population`] wraps the organism collection; [`Organism`] is a handle on
//! one stored organism that evaluates, competes and breeds.

pub mod manager;
pub mod organism;
pub mod record;
pub mod stats;

pub use manager::{Population, SortedOrganisms};
pub use organism::{Organism, DONORS};
pub use record::OrganismRecord;
pub use stats::PopulationStats;
