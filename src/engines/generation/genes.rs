//! Catalog of the hyperparameters an organism evolves.
//!
//! Groups follow the downstream model: how training examples are cut from the
//! price history (`Data`), the shape of the network (`Model`), and how it is
//! trained (`Optimizer`, `Scheduler`).

use super::genotype::ParamValue;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneKind {
    /// Rounded to the nearest integer when decoded.
    Integer,
    Float,
}

/// Description of a single gene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneSpec {
    pub group: &'static str,
    pub name: &'static str,
    pub kind: GeneKind,
    /// Value used when a genotype does not store the gene.
    pub default: f64,
    /// Hard limits every stored or mutated value is clamped to.
    pub bounds: (f64, f64),
    /// Range a randomized genotype draws from.
    pub default_range: (f64, f64),
}

impl GeneSpec {
    const fn new(
        group: &'static str,
        name: &'static str,
        kind: GeneKind,
        default: f64,
        bounds: (f64, f64),
        default_range: (f64, f64),
    ) -> Self {
        Self {
            group,
            name,
            kind,
            default,
            bounds,
            default_range,
        }
    }

    /// `Group.name`, the form used to refer to genes in configuration.
    pub fn key(&self) -> String {
        format!("{}.{}", self.group, self.name)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.default;
        }
        value.clamp(self.bounds.0, self.bounds.1)
    }

    pub fn express(&self, raw: f64) -> ParamValue {
        let value = self.clamp(raw);
        match self.kind {
            GeneKind::Integer => ParamValue::Integer(value.round() as i64),
            GeneKind::Float => ParamValue::Float(value),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let (low, high) = self.default_range;
        if low >= high {
            return self.clamp(low);
        }
        self.clamp(rng.gen_range(low..=high))
    }
}

use GeneKind::{Float, Integer};

pub const GENES: &[GeneSpec] = &[
    GeneSpec::new("Data", "batch_size", Integer, 128.0, (16.0, 1024.0), (64.0, 256.0)),
    GeneSpec::new("Data", "history_days", Integer, 252.0, (21.0, 1000.0), (126.0, 378.0)),
    GeneSpec::new("Data", "forecast_days", Integer, 4.0, (1.0, 21.0), (4.0, 4.0)),
    GeneSpec::new("Data", "div_share", Float, 0.7, (0.0, 1.0), (0.5, 0.9)),
    GeneSpec::new("Model", "kernels", Integer, 2.0, (2.0, 8.0), (2.0, 4.0)),
    GeneSpec::new("Model", "sub_blocks", Integer, 1.0, (1.0, 8.0), (1.0, 2.0)),
    GeneSpec::new("Model", "gate_channels", Integer, 16.0, (1.0, 256.0), (8.0, 32.0)),
    GeneSpec::new("Model", "residual_channels", Integer, 16.0, (1.0, 256.0), (8.0, 32.0)),
    GeneSpec::new("Model", "skip_channels", Integer, 16.0, (1.0, 256.0), (8.0, 32.0)),
    GeneSpec::new("Model", "end_channels", Integer, 16.0, (1.0, 256.0), (8.0, 32.0)),
    GeneSpec::new("Optimizer", "weight_decay", Float, 0.01, (0.0, 0.5), (0.001, 0.02)),
    GeneSpec::new("Scheduler", "max_lr", Float, 0.01, (1e-5, 1.0), (0.005, 0.02)),
    GeneSpec::new("Scheduler", "epochs", Float, 3.0, (0.1, 20.0), (2.0, 4.0)),
    GeneSpec::new("Scheduler", "pct_start", Float, 0.3, (0.01, 0.99), (0.2, 0.4)),
    GeneSpec::new("Scheduler", "base_momentum", Float, 0.85, (0.5, 0.99), (0.8, 0.9)),
    GeneSpec::new("Scheduler", "max_momentum", Float, 0.95, (0.5, 0.999), (0.9, 0.99)),
    GeneSpec::new("Scheduler", "div_factor", Float, 25.0, (1.0, 1000.0), (20.0, 30.0)),
    GeneSpec::new("Scheduler", "final_div_factor", Float, 1e4, (1.0, 1e6), (5e3, 2e4)),
];

pub fn find(group: &str, name: &str) -> Option<&'static GeneSpec> {
    GENES.iter().find(|gene| gene.group == group && gene.name == name)
}

/// Looks a gene up by its `Group.name` key.
pub fn find_by_key(key: &str) -> Option<&'static GeneSpec> {
    let (group, name) = key.split_once('.')?;
    find(group, name)
}
