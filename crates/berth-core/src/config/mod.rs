//! Configuration: TOML file with `${VAR}` substitution.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{Config, RequirementsConfig, StorageConfig};
