pub mod traits;
pub mod evolution;
pub mod store;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use store::{StoreBackend, StoreConfig};
pub use traits::ConfigSection;
