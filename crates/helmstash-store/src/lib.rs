//! Pluggable release storage backends.
//!
//! One backend is selected at startup from configuration; the set of
//! supported backends is closed, so the store is a tagged enum over the
//! concrete drivers rather than a trait object. Every driver implements
//! the same contract: strongly-consistent point reads, full-upsert
//! writes, idempotent deletes, scan-then-filter listing, chunked bulk
//! loads, and idempotent provisioning.

use std::collections::HashMap;

use helmstash_config::{Backend, Config};
use helmstash_core::release::{Release, Releases};

pub mod batch;
pub mod dynamo;
pub mod error;
pub mod mongo;

pub use dynamo::DynamoReleaseStore;
pub use error::{StoreError, StoreResult};
pub use mongo::MongoReleaseStore;

/// A release store driven by one configured backend.
pub enum ReleaseStore {
    Dynamo(DynamoReleaseStore),
    Mongo(MongoReleaseStore),
}

impl ReleaseStore {
    /// Connects the backend selected by `config` and returns the store
    /// driving it.
    pub async fn from_config(config: &Config) -> StoreResult<Self> {
        match config.backend {
            Backend::Dynamodb => {
                Ok(Self::Dynamo(
                    DynamoReleaseStore::connect(&config.dynamodb).await?,
                ))
            }
            Backend::Mongodb => {
                Ok(Self::Mongo(
                    MongoReleaseStore::connect(&config.mongodb).await?,
                ))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Dynamo(_) => "dynamodb",
            Self::Mongo(_) => "mongodb",
        }
    }

    /// Point lookup by `unique_id`. A missing key is
    /// [`StoreError::NotFound`], distinguishable from backend failures.
    pub async fn get(&self, unique_id: &str) -> StoreResult<Release> {
        match self {
            Self::Dynamo(store) => store.get(unique_id).await,
            Self::Mongo(store) => store.get(unique_id).await,
        }
    }

    /// Full upsert: overwrites every attribute of the stored record.
    /// Callers wanting a partial update must get, mutate, and put.
    pub async fn put(&self, release: &Release) -> StoreResult<()> {
        if release.unique_id.is_empty() {
            return Err(StoreError::MissingUniqueId);
        }
        match self {
            Self::Dynamo(store) => store.put(release).await,
            Self::Mongo(store) => store.put(release).await,
        }
    }

    /// Idempotent delete; removing a missing key succeeds.
    pub async fn delete(&self, unique_id: &str) -> StoreResult<()> {
        match self {
            Self::Dynamo(store) => store.delete(unique_id).await,
            Self::Mongo(store) => store.delete(unique_id).await,
        }
    }

    /// Full scan filtered through the label selector. List order is
    /// backend-defined.
    pub async fn list(&self, selector: &HashMap<String, String>) -> StoreResult<Releases> {
        match self {
            Self::Dynamo(store) => store.list(selector).await,
            Self::Mongo(store) => store.list(selector).await,
        }
    }

    /// Bulk upsert through the batch loader. Not atomic: on failure some
    /// unknown prefix of the input was written.
    pub async fn load(&self, releases: &[Release]) -> StoreResult<()> {
        if releases.iter().any(|release| release.unique_id.is_empty()) {
            return Err(StoreError::MissingUniqueId);
        }
        match self {
            Self::Dynamo(store) => store.load(releases).await,
            Self::Mongo(store) => store.load(releases).await,
        }
    }

    /// Idempotent provisioning of the backing table/collection.
    pub async fn setup(&self) -> StoreResult<()> {
        match self {
            Self::Dynamo(store) => store.setup().await,
            Self::Mongo(store) => store.setup().await,
        }
    }
}
