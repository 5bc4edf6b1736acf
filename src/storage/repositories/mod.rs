//! Repository implementations for configuration storage

pub mod configuration;
pub mod memory;

pub use configuration::{ConfigurationStore, SqlxConfigurationStore};
pub use memory::InMemoryConfigurationStore;
