pub mod config;
pub mod error;

pub use config::{Backend, Config, DynamoConfig, MongoConfig, ServerConfig};
pub use error::{ConfigError, Result};
