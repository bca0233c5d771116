use super::{evolution::EvolutionConfig, store::StoreConfig, traits::ConfigSection};
use crate::error::TradevolveError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix of environment overrides, e.g. `TRADEVOLVE__STORE__BACKEND=memory`.
pub const ENV_PREFIX: &str = "TRADEVOLVE";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), TradevolveError> {
        validate_section(&self.evolution)?;
        validate_section(&self.store)?;
        Ok(())
    }

    /// Layers an optional TOML/JSON file and environment overrides on top of
    /// the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, TradevolveError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| TradevolveError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| TradevolveError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }
}

/// Validates one section, naming it in the error.
fn validate_section<S: ConfigSection>(section: &S) -> Result<(), TradevolveError> {
    section.validate().map_err(|e| match e {
        TradevolveError::Configuration(message) => {
            TradevolveError::Configuration(format!("[{}] {}", S::section_name(), message))
        }
        other => other,
    })
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TradevolveError> {
        self.replace(AppConfig::load(Some(path.as_ref()))?)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn load_from_env(&self) -> Result<(), TradevolveError> {
        self.replace(AppConfig::load(None)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), TradevolveError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| TradevolveError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| TradevolveError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Applies `f` to a copy and keeps it only if the result validates.
    pub fn update<F>(&self, f: F) -> Result<(), TradevolveError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut next = self.get();
        f(&mut next);
        next.validate()?;
        self.replace(next)
    }

    fn replace(&self, config: AppConfig) -> Result<(), TradevolveError> {
        let mut current = self
            .config
            .write()
            .map_err(|_| TradevolveError::Configuration("Config lock poisoned".to_string()))?;
        *current = config;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tradevolve.toml");
        std::fs::write(
            &path,
            "[evolution]\nscale_factor = 0.5\n\n[store]\nbackend = \"memory\"\nseed = 9\n",
        )
        .unwrap();

        let manager = ConfigManager::new();
        manager.load_from_file(&path).unwrap();
        let config = manager.get();
        assert_eq!(config.evolution.scale_factor, 0.5);
        assert_eq!(config.evolution.crossover_rate, 0.9);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.seed, Some(9));
        assert_eq!(config.store.collection, "models");
    }

    #[test]
    fn test_invalid_file_is_rejected_and_previous_config_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[evolution]\ncrossover_rate = 3.0\n").unwrap();

        let manager = ConfigManager::new();
        let err = manager.load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("[evolution]"), "{}", err);
        assert_eq!(manager.get(), AppConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.toml");

        let manager = ConfigManager::new();
        manager
            .update(|config| {
                config.evolution.donor_base = false;
                config.store.collection = "champions".to_string();
            })
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let reloaded = ConfigManager::new();
        reloaded.load_from_file(&path).unwrap();
        assert_eq!(reloaded.get(), manager.get());
    }

    #[test]
    fn test_update_rejects_invalid_change() {
        let manager = ConfigManager::new();
        let result = manager.update(|config| config.evolution.scale_factor = -1.0);
        assert!(result.is_err());

        let result = manager.update(|config| config.store.collection = String::new());
        assert!(result.unwrap_err().to_string().contains("[store]"));
        assert_eq!(manager.get().evolution.scale_factor, 0.8);
    }
}
