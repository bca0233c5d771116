pub mod genes;
pub mod genotype;
pub mod operators;

pub use genes::{GeneKind, GeneSpec, GENES};
pub use genotype::{Genotype, ParamValue, Phenotype};
pub use operators::DifferentialMutation;
