pub mod fitness;

pub use fitness::{Evaluation, FitnessEvaluator};
