//! MongoDB release store driver.

use std::collections::HashMap;

use futures::TryStreamExt;
use helmstash_config::MongoConfig;
use helmstash_core::release::{Release, Releases};
use mongodb::{
    bson::{doc, Document},
    error::ErrorKind,
    options::{CollectionOptions, IndexOptions, ReadConcern, ReplaceOneModel, WriteModel},
    Client, Collection, IndexModel,
};
use tracing::debug;

use super::codec;
use crate::{
    batch::load_batched,
    error::{StoreError, StoreResult},
};

/// Per-call cap on bulk upserts. MongoDB's own limit is far higher; this
/// matches the write sizes the bulk interchange tooling was designed
/// around.
const MAX_BATCH_SIZE: usize = 500;

const BACKEND: &str = "mongodb";

/// Command error code for "collection already exists".
const NAMESPACE_EXISTS: i32 = 48;

/// Stores and retrieves releases from a MongoDB collection.
pub struct MongoReleaseStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoReleaseStore {
    pub async fn connect(config: &MongoConfig) -> StoreResult<Self> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|err| StoreError::backend(BACKEND, "connect", err))?;
        let database = client.database(&config.database);
        // Majority reads so a Put is visible to an immediate re-read.
        let options = CollectionOptions::builder()
            .read_concern(ReadConcern::majority())
            .build();
        let collection = database.collection_with_options(&config.collection, options);
        Ok(Self { client, collection })
    }

    pub async fn get(&self, unique_id: &str) -> StoreResult<Release> {
        let filter = doc! { codec::FIELD_UNIQUE_ID: unique_id };
        match self.collection.find_one(filter).await {
            Ok(Some(document)) => Ok(codec::decode(&document)),
            Ok(None) => {
                Err(StoreError::NotFound {
                    unique_id: unique_id.to_string(),
                })
            }
            Err(err) => Err(StoreError::backend(BACKEND, "get", err)),
        }
    }

    pub async fn put(&self, release: &Release) -> StoreResult<()> {
        let filter = doc! { codec::FIELD_UNIQUE_ID: &release.unique_id };
        self.collection
            .replace_one(filter, codec::encode(release))
            .upsert(true)
            .await
            .map_err(|err| StoreError::backend(BACKEND, "put", err))?;
        Ok(())
    }

    pub async fn delete(&self, unique_id: &str) -> StoreResult<()> {
        let filter = doc! { codec::FIELD_UNIQUE_ID: unique_id };
        self.collection
            .delete_one(filter)
            .await
            .map_err(|err| StoreError::backend(BACKEND, "delete", err))?;
        Ok(())
    }

    /// Full collection scan, filtered client-side through the selector
    /// matcher.
    pub async fn list(&self, selector: &HashMap<String, String>) -> StoreResult<Releases> {
        let mut cursor = self
            .collection
            .find(Document::new())
            .await
            .map_err(|err| StoreError::backend(BACKEND, "list", err))?;

        let mut releases = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|err| StoreError::backend(BACKEND, "list", err))?
        {
            let release = codec::decode(&document);
            if release.unique_id.is_empty() {
                continue;
            }
            if release.matches_selector(selector) {
                releases.push(release);
            }
        }
        Ok(releases)
    }

    pub async fn load(&self, releases: &[Release]) -> StoreResult<()> {
        let namespace = self.collection.namespace();
        let encoded: Vec<(String, Document)> = releases
            .iter()
            .map(|release| (release.unique_id.clone(), codec::encode(release)))
            .collect();

        load_batched(encoded, MAX_BATCH_SIZE, |chunk| {
            let client = self.client.clone();
            let namespace = namespace.clone();
            async move {
                let models: Vec<WriteModel> = chunk
                    .into_iter()
                    .map(|(unique_id, document)| {
                        WriteModel::ReplaceOne(
                            ReplaceOneModel::builder()
                                .namespace(namespace.clone())
                                .filter(doc! { codec::FIELD_UNIQUE_ID: unique_id })
                                .replacement(document)
                                .upsert(true)
                                .build(),
                        )
                    })
                    .collect();
                client
                    .bulk_write(models)
                    .await
                    .map(|_| ())
                    .map_err(|err| StoreError::backend(BACKEND, "load", err))
            }
        })
        .await
    }

    /// Creates the collection if absent and ensures the unique key index.
    pub async fn setup(&self) -> StoreResult<()> {
        let namespace = self.collection.namespace();
        let database = self.client.database(&namespace.db);
        if let Err(err) = database.create_collection(&namespace.coll).await {
            if !namespace_exists(&err) {
                return Err(StoreError::backend(BACKEND, "setup", err));
            }
        } else {
            debug!("Created MongoDB collection {namespace}");
        }

        let index = IndexModel::builder()
            .keys(doc! { codec::FIELD_UNIQUE_ID: 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection
            .create_index(index)
            .await
            .map_err(|err| StoreError::backend(BACKEND, "setup", err))?;
        Ok(())
    }
}

fn namespace_exists(err: &mongodb::error::Error) -> bool {
    matches!(*err.kind, ErrorKind::Command(ref command) if command.code == NAMESPACE_EXISTS)
}
