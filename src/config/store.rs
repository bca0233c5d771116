use super::traits::ConfigSection;
use crate::error::TradevolveError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    JsonFile,
}

/// Where the population lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory holding collection files for the `json_file` backend.
    pub path: PathBuf,
    pub collection: String,
    /// Seed for store sampling; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::JsonFile,
            path: PathBuf::from("data"),
            collection: "models".to_string(),
            seed: None,
        }
    }
}

impl ConfigSection for StoreConfig {
    fn section_name() -> &'static str {
        "store"
    }

    fn validate(&self) -> Result<(), TradevolveError> {
        let valid_name = !self.collection.is_empty()
            && self
                .collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_name {
            return Err(TradevolveError::Configuration(format!(
                "Collection name '{}' must be non-empty and use only letters, digits, '_' or '-'",
                self.collection
            )));
        }
        if self.backend == StoreBackend::JsonFile && self.path.as_os_str().is_empty() {
            return Err(TradevolveError::Configuration(
                "JSON file store needs a directory path".to_string()
            ));
        }
        Ok(())
    }
}
