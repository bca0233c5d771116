use super::genes::{self, GeneSpec, GENES};
use super::operators::{lineage_seed, DifferentialMutation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stored gene values, grouped as `group -> gene -> value`.
///
/// Genes absent from the map take their catalog default, so the empty
/// genotype is the default organism. A genotype is only ever replaced as a
/// whole; children are built by [`Genotype::make_child`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genotype {
    genes: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Decoded parameter value handed to the fitness evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Integer(v) => v as f64,
            ParamValue::Float(v) => v,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ParamValue::Integer(v) => Some(v),
            ParamValue::Float(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Evaluator-ready parameters, grouped like the genotype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phenotype(BTreeMap<String, BTreeMap<String, ParamValue>>);

impl Phenotype {
    pub fn get(&self, group: &str, name: &str) -> Option<ParamValue> {
        self.0.get(group)?.get(name).copied()
    }

    pub fn group(&self, group: &str) -> Option<&BTreeMap<String, ParamValue>> {
        self.0.get(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, ParamValue>)> {
        self.0.iter()
    }

    fn insert(&mut self, group: &str, name: &str, value: ParamValue) {
        self.0
            .entry(group.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }
}

impl fmt::Display for Phenotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (group, params)) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let params: Vec<String> = params
                .iter()
                .map(|(name, value)| format!("{} = {}", name, value))
                .collect();
            write!(f, "{}: {}", group, params.join(", "))?;
        }
        Ok(())
    }
}

impl Genotype {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every catalog gene from its default range.
    pub fn randomized<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut genotype = Self::new();
        for gene in GENES {
            genotype.set(gene.group, gene.name, gene.sample(rng));
        }
        genotype
    }

    pub fn with(mut self, group: &str, name: &str, value: f64) -> Self {
        self.set(group, name, value);
        self
    }

    pub fn set(&mut self, group: &str, name: &str, value: f64) {
        self.genes
            .entry(group.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    /// Stored value, without falling back to the default.
    pub fn get(&self, group: &str, name: &str) -> Option<f64> {
        self.genes.get(group)?.get(name).copied()
    }

    /// Stored value or the catalog default.
    pub fn value(&self, gene: &GeneSpec) -> f64 {
        self.get(gene.group, gene.name).unwrap_or(gene.default)
    }

    pub fn is_empty(&self) -> bool {
        self.genes.values().all(BTreeMap::is_empty)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.genes.iter().flat_map(|(group, values)| {
            values
                .iter()
                .map(move |(name, value)| (group.as_str(), name.as_str(), *value))
        })
    }

    /// Maps stored values to evaluator parameters.
    ///
    /// Catalog genes are clamped and rounded per their kind; genes unknown to
    /// the catalog are passed through as floats.
    pub fn decode(&self) -> Phenotype {
        let mut phenotype = Phenotype::default();
        for gene in GENES {
            phenotype.insert(gene.group, gene.name, gene.express(self.value(gene)));
        }
        for (group, name, value) in self.iter() {
            if genes::find(group, name).is_none() {
                phenotype.insert(group, name, ParamValue::Float(value));
            }
        }
        phenotype
    }

    /// Differential mutation against three donors.
    ///
    /// Every gene that is not frozen mutates with probability
    /// `crossover_rate`, and one of them always does. A mutated gene becomes
    /// `base + scale_factor * (b - c)` clamped to its bounds, where `base` is
    /// donor `a` or this genotype depending on `donor_base`. The crossover
    /// draws are seeded from the four inputs, so the result is a pure function
    /// of them.
    pub fn make_child(
        &self,
        a: &Genotype,
        b: &Genotype,
        c: &Genotype,
        params: &DifferentialMutation,
    ) -> Genotype {
        let mut rng = StdRng::seed_from_u64(lineage_seed(&[self, a, b, c]));
        let mutable: Vec<&GeneSpec> = GENES.iter().filter(|gene| !params.is_frozen(gene)).collect();
        let forced = if mutable.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..mutable.len()))
        };

        let mut child = self.clone();
        for (i, gene) in mutable.into_iter().enumerate() {
            let draw: f64 = rng.gen();
            if draw >= params.crossover_rate && forced != Some(i) {
                continue;
            }
            let base = if params.donor_base { a.value(gene) } else { self.value(gene) };
            let mutated = base + params.scale_factor * (b.value(gene) - c.value(gene));
            child.set(gene.group, gene.name, gene.clamp(mutated));
        }
        child
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.decode().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn donors() -> (Genotype, Genotype, Genotype, Genotype) {
        let mut rng = StdRng::seed_from_u64(11);
        (
            Genotype::randomized(&mut rng),
            Genotype::randomized(&mut rng),
            Genotype::randomized(&mut rng),
            Genotype::randomized(&mut rng),
        )
    }

    #[test]
    fn test_empty_genotype_decodes_to_defaults() {
        let phenotype = Genotype::new().decode();
        assert_eq!(phenotype.get("Data", "batch_size"), Some(ParamValue::Integer(128)));
        assert_eq!(phenotype.get("Scheduler", "max_lr"), Some(ParamValue::Float(0.01)));
        assert_eq!(phenotype.groups().count(), 4);
    }

    #[test]
    fn test_decode_is_deterministic_and_keeps_unknown_genes() {
        let genotype = Genotype::new()
            .with("Model", "kernels", 5.4)
            .with("Utility", "temperature", 0.25);
        assert_eq!(genotype.decode(), genotype.decode());
        assert_eq!(genotype.decode().get("Model", "kernels"), Some(ParamValue::Integer(5)));
        assert_eq!(
            genotype.decode().get("Utility", "temperature"),
            Some(ParamValue::Float(0.25))
        );
    }

    #[test]
    fn test_make_child_is_pure() {
        let (parent, a, b, c) = donors();
        let params = DifferentialMutation::default();
        let first = parent.make_child(&a, &b, &c, &params);
        let second = parent.make_child(&a, &b, &c, &params);
        assert_eq!(first, second);
        for (group, name, value) in first.iter() {
            assert_eq!(value.to_bits(), second.get(group, name).unwrap().to_bits());
        }
    }

    #[test]
    fn test_make_child_does_not_touch_parents() {
        let (parent, a, b, c) = donors();
        let snapshot = (parent.clone(), a.clone(), b.clone(), c.clone());
        let mut child = parent.make_child(&a, &b, &c, &DifferentialMutation::default());
        child.set("Model", "kernels", 7.0);
        assert_eq!((parent, a, b, c), snapshot);
    }

    #[test]
    fn test_full_crossover_applies_differential_update() {
        let parent = Genotype::new();
        let a = Genotype::new().with("Data", "div_share", 0.5);
        let b = Genotype::new().with("Data", "div_share", 0.6);
        let c = Genotype::new().with("Data", "div_share", 0.4);
        let params = DifferentialMutation {
            scale_factor: 0.5,
            crossover_rate: 1.0,
            donor_base: true,
            frozen: BTreeSet::new(),
        };

        let child = parent.make_child(&a, &b, &c, &params);
        let share = child.get("Data", "div_share").unwrap();
        assert!((share - 0.6).abs() < 1e-12);
        assert_eq!(child.get("Model", "kernels"), Some(2.0));
    }

    #[test]
    fn test_parent_base_and_clamping() {
        let parent = Genotype::new().with("Data", "div_share", 0.9);
        let b = Genotype::new().with("Data", "div_share", 1.0);
        let c = Genotype::new().with("Data", "div_share", 0.0);
        let params = DifferentialMutation {
            scale_factor: 1.0,
            crossover_rate: 1.0,
            donor_base: false,
            frozen: BTreeSet::new(),
        };

        let child = parent.make_child(&Genotype::new(), &b, &c, &params);
        assert_eq!(child.get("Data", "div_share"), Some(1.0));
    }

    #[test]
    fn test_frozen_genes_are_copied() {
        let (parent, a, b, c) = donors();
        let params = DifferentialMutation {
            crossover_rate: 1.0,
            ..DifferentialMutation::default()
        };
        let child = parent.make_child(&a, &b, &c, &params);
        assert_eq!(
            child.get("Data", "forecast_days"),
            parent.get("Data", "forecast_days")
        );
    }

    #[test]
    fn test_zero_crossover_still_mutates_one_gene() {
        let (parent, a, b, c) = donors();
        let params = DifferentialMutation {
            crossover_rate: 0.0,
            ..DifferentialMutation::default()
        };
        let child = parent.make_child(&a, &b, &c, &params);
        let changed = GENES
            .iter()
            .filter(|gene| child.value(gene) != parent.value(gene))
            .count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_serde_round_trip_preserves_values() {
        let (genotype, ..) = donors();
        let json = serde_json::to_value(&genotype).unwrap();
        let back: Genotype = serde_json::from_value(json).unwrap();
        assert_eq!(back, genotype);
        assert_eq!(serde_json::to_string(&Genotype::new()).unwrap(), "{}");
    }
}
