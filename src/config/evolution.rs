use super::traits::ConfigSection;
use crate::engines::generation::genes;
use crate::error::TradevolveError;
use serde::{Deserialize, Serialize};

/// Differential mutation settings used when organisms reproduce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub scale_factor: f64,
    pub crossover_rate: f64,
    pub donor_base: bool,
    pub frozen_genes: Vec<String>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            scale_factor: 0.8,
            crossover_rate: 0.9,
            donor_base: true,
            frozen_genes: vec!["Data.forecast_days".to_string()],
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), TradevolveError> {
        if !(self.scale_factor > 0.0 && self.scale_factor <= 2.0) {
            return Err(TradevolveError::Configuration(
                "Scale factor must be in (0, 2]".to_string()
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(TradevolveError::Configuration(
                "Crossover rate must be between 0 and 1".to_string()
            ));
        }
        let unknown = self
            .frozen_genes
            .iter()
            .find(|key| genes::find_by_key(key).is_none());
        if let Some(unknown) = unknown {
            return Err(TradevolveError::Configuration(format!(
                "Unknown frozen gene '{}', expected Group.name",
                unknown
            )));
        }
        Ok(())
    }
}
