//! Application configuration.
//!
//! Configuration is read from a TOML file resolved from `$HELMSTASH_CONFIG`
//! or `$XDG_CONFIG_HOME/helmstash/config.toml`, with `HELMSTASH_*`
//! environment variables overriding the backend selection and connection
//! coordinates.

use std::{
    fmt, fs,
    path::PathBuf,
    str::FromStr,
    sync::{LazyLock, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// The storage backend a release store is driven by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Dynamodb,
    Mongodb,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Dynamodb => write!(f, "dynamodb"),
            Backend::Mongodb => write!(f, "mongodb"),
        }
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dynamodb" => Ok(Backend::Dynamodb),
            "mongodb" => Ok(Backend::Mongodb),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

/// DynamoDB driver settings. Credentials and region come from the standard
/// AWS environment/config chain.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DynamoConfig {
    /// Name of the table holding releases.
    pub table: String,

    /// Optional endpoint override, e.g. a local DynamoDB instance.
    pub endpoint_url: Option<String>,
}

impl Default for DynamoConfig {
    fn default() -> Self {
        Self {
            table: "helm-charts".to_string(),
            endpoint_url: None,
        }
    }
}

/// MongoDB driver settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MongoConfig {
    /// Connection string.
    pub uri: String,

    /// Database holding the release collection.
    pub database: String,

    /// Collection name.
    pub collection: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "helmstash".to_string(),
            collection: "releases".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,

    /// Static bearer token required on the apply endpoint. Unset disables
    /// authentication.
    pub auth_token: Option<String>,

    /// Timeout in seconds handed to helm for install/upgrade operations.
    pub helm_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            auth_token: None,
            helm_timeout_secs: 300,
        }
    }
}

/// Application's configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// The backend for the release store.
    pub backend: Backend,

    /// Deadline in seconds applied to each store operation.
    pub timeout_secs: u64,

    pub dynamodb: DynamoConfig,

    pub mongodb: MongoConfig,

    pub server: ServerConfig,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("HELMSTASH_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("helmstash").join("config.toml"),
    })
});

fn xdg_config_home() -> PathBuf {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        }
    }
}

pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG.write().unwrap();
    *global_config = Some(config);
    Ok(())
}

pub fn get_config() -> Config {
    {
        let config_guard = CONFIG.read().unwrap();
        if let Some(config) = config_guard.as_ref() {
            return config.clone();
        }
    }

    let mut config_guard = CONFIG.write().unwrap();
    if config_guard.is_none() {
        *config_guard = Some(Config::default());
    }
    config_guard.as_ref().unwrap().clone()
}

/// Writes the default configuration to the config path. Refuses to
/// overwrite an existing file.
pub fn generate_default_config() -> Result<()> {
    let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&Config::default())?;
    fs::write(&config_path, serialized)?;
    tracing::info!("Created default config at {}", config_path.display());
    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Dynamodb,
            timeout_secs: 30,
            dynamodb: DynamoConfig::default(),
            mongodb: MongoConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from the config file, falling back to the
    /// defaults when the file does not exist, then applies environment
    /// overrides.
    pub fn new() -> Result<Self> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();

        let mut config: Config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `HELMSTASH_*` environment overrides. The lookup is injected
    /// so tests can run without mutating the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("HELMSTASH_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(table) = lookup("HELMSTASH_DYNAMODB_TABLE") {
            self.dynamodb.table = table;
        }
        if let Some(endpoint) = lookup("HELMSTASH_DYNAMODB_ENDPOINT") {
            self.dynamodb.endpoint_url = Some(endpoint);
        }
        if let Some(uri) = lookup("HELMSTASH_MONGODB_URI") {
            self.mongodb.uri = uri;
        }
        if let Some(database) = lookup("HELMSTASH_MONGODB_DATABASE") {
            self.mongodb.database = database;
        }
        if let Some(collection) = lookup("HELMSTASH_MONGODB_COLLECTION") {
            self.mongodb.collection = collection;
        }
        if let Some(timeout) = lookup("HELMSTASH_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => warn!("Ignoring non-numeric HELMSTASH_TIMEOUT {timeout:?}"),
            }
        }
        Ok(())
    }
}
