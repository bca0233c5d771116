use super::genes::GeneSpec;
use super::genotype::Genotype;
use crate::config::EvolutionConfig;
use std::collections::BTreeSet;

/// Parameters of the differential mutation operator.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialMutation {
    /// Weight of the donor difference (`F`).
    pub scale_factor: f64,
    /// Probability that a gene mutates (`CR`).
    pub crossover_rate: f64,
    /// Mutate from donor `a` (DE/rand/1) instead of from the parent.
    pub donor_base: bool,
    /// `Group.name` keys always copied from the parent.
    pub frozen: BTreeSet<String>,
}

impl DifferentialMutation {
    pub fn is_frozen(&self, gene: &GeneSpec) -> bool {
        self.frozen.contains(&gene.key())
    }
}

impl Default for DifferentialMutation {
    fn default() -> Self {
        Self::from(&EvolutionConfig::default())
    }
}

impl From<&EvolutionConfig> for DifferentialMutation {
    fn from(config: &EvolutionConfig) -> Self {
        Self {
            scale_factor: config.scale_factor,
            crossover_rate: config.crossover_rate,
            donor_base: config.donor_base,
            frozen: config.frozen_genes.iter().cloned().collect(),
        }
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Stable 64-bit fingerprint of an ordered list of genotypes.
///
/// FNV-1a over group names, gene names and the exact bit patterns of the
/// values; stable across processes and platforms.
pub fn lineage_seed(genotypes: &[&Genotype]) -> u64 {
    let mut hash = FNV_OFFSET;
    for genotype in genotypes {
        for (group, name, value) in genotype.iter() {
            hash = fnv1a(hash, group.as_bytes());
            hash = fnv1a(hash, &[0x1f]);
            hash = fnv1a(hash, name.as_bytes());
            hash = fnv1a(hash, &value.to_bits().to_le_bytes());
        }
        hash = fnv1a(hash, &[0x1e]);
    }
    hash
}
